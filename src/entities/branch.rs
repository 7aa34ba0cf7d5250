//! Branch entity - The store location orders are booked against.
//!
//! Branches are unique by name and are created once per configured name; the
//! pipeline never rewrites an existing branch's identity fields.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Branch database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "branches")]
pub struct Model {
    /// Unique identifier for the branch
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Branch display name (e.g., "왕십리한양대점")
    #[sea_orm(unique)]
    pub name: String,
    /// Commercial area classification used by reporting
    pub area_type: String,
    /// When the branch row was created
    pub created_at: DateTime,
    /// When the branch row was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Branch and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One branch has many orders
    #[sea_orm(has_many = "super::sales_order::Entity")]
    Orders,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
