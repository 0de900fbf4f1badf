//! Tunable inputs for the report operations.
//!
//! Every knob a report accepts lives in a named struct with a documented
//! default, so callers pass `..Default::default()` instead of a loose bag of
//! optional numbers.

/// Days covered by the daily closing series and its average. Matches the
/// lookback the product has always used.
pub const DEFAULT_CLOSING_DAYS: i64 = 90;

/// Days covered by the recent-window reports (income sum, debit count).
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Category excluded from income sums by default (internal transfers).
pub const DEFAULT_EXCLUDED_CATEGORY: i64 = 18_020_004;

/// Default lower bound for [`IncomeThresholdParams`]: 15.00 in minor units.
pub const DEFAULT_INCOME_THRESHOLD_MINOR: i64 = 1_500;

/// Window for `daily_closing_series` and `average_balance`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClosingSeriesParams {
    /// Number of calendar days ending today. `<= 0` yields an empty series;
    /// exactly 0 makes the average a division-by-zero error.
    pub requested_days: i64,
}

impl Default for ClosingSeriesParams {
    fn default() -> Self {
        Self {
            requested_days: DEFAULT_CLOSING_DAYS,
        }
    }
}

/// How segment sums are paired with their divisors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentDivisors {
    /// Divide each segment's sum by the *other* segment's day count (and
    /// size the recent window by `first_days`). This reproduces the
    /// behaviour the API has always shipped and is therefore the default.
    #[default]
    Crossed,
    /// Size and divide each segment by its own day count.
    Matched,
}

/// Windows for `average_segment_balance`, both measured back from today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentParams {
    /// Total lookback; the "first" segment sits at its far end.
    pub total_days: i64,
    /// Day count of the oldest segment.
    pub first_days: i64,
    /// Day count of the most recent segment.
    pub last_days: i64,
    pub divisors: SegmentDivisors,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            total_days: DEFAULT_CLOSING_DAYS,
            first_days: DEFAULT_WINDOW_DAYS,
            last_days: DEFAULT_WINDOW_DAYS,
            divisors: SegmentDivisors::default(),
        }
    }
}

/// Window and category filter for `income_sum`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncomeWindowParams {
    pub last_days: i64,
    /// Credits in this category do not count as income.
    pub except_category: i64,
}

impl Default for IncomeWindowParams {
    fn default() -> Self {
        Self {
            last_days: DEFAULT_WINDOW_DAYS,
            except_category: DEFAULT_EXCLUDED_CATEGORY,
        }
    }
}

/// Window for `debit_count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecentWindowParams {
    pub last_days: i64,
}

impl Default for RecentWindowParams {
    fn default() -> Self {
        Self {
            last_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Lower bound for `income_over_threshold`. Strictly greater-than.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncomeThresholdParams {
    pub amount_over_minor: i64,
}

impl Default for IncomeThresholdParams {
    fn default() -> Self {
        Self {
            amount_over_minor: DEFAULT_INCOME_THRESHOLD_MINOR,
        }
    }
}
