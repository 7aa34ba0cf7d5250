//! Menu entity - A sellable product.
//!
//! Each menu belongs to exactly one category. The base price is taken from the
//! first line item seen for the name and is never negative.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
pub struct Model {
    /// Unique identifier for the menu
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name as printed on the receipt
    #[sea_orm(unique)]
    pub name: String,
    /// ID of the category this menu is listed under
    pub category_id: i64,
    /// Unit price at first sight, clamped to zero
    pub base_price: f64,
    /// When the menu was created
    pub created_at: DateTime,
    /// When the menu was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Menu and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each menu belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One menu appears on many order items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
