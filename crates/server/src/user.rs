//! The module contains the users entity the auth middleware resolves.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub initial_balance_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The engine-facing identity for the authenticated row.
pub fn engine_user(model: &Model) -> engine::User {
    engine::User {
        id: model.username.clone(),
        initial_balance_minor: model.initial_balance_minor,
    }
}
