//! Category entity - Menu grouping as exported by the POS (e.g., "Drink").
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Category name, unique across the store
    #[sea_orm(unique)]
    pub name: String,
    /// When the category was created
    pub created_at: DateTime,
    /// When the category was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category has many menus
    #[sea_orm(has_many = "super::menu::Entity")]
    Menus,
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
