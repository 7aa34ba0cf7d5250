//! Order item entity - One sold line on an order.
//!
//! Each item references exactly one order and one menu. Amounts are stored as exported
//! (discounts keep their sign); `total_amount` is the realized sales amount of the line.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning order
    pub order_id: i64,
    /// ID of the menu sold on this line
    pub menu_id: i64,
    /// Units sold, at least 1
    pub quantity: i32,
    /// Unit price on this line
    pub unit_price: f64,
    /// Selected option, if any
    pub option_name: Option<String>,
    /// Surcharge for the option
    pub option_price: f64,
    /// Discount applied to the product
    pub product_discount: f64,
    /// Share of the order-level discount
    pub order_discount: f64,
    /// Actual sales amount including options and discounts
    pub total_amount: f64,
    /// `"taxable"` or the exported tax classification
    pub tax_type: String,
    /// VAT portion of `total_amount`
    pub vat_amount: f64,
    /// When the item row was created
    pub created_at: DateTime,
    /// When the item row was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between OrderItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one order
    #[sea_orm(
        belongs_to = "super::sales_order::Entity",
        from = "Column::OrderId",
        to = "super::sales_order::Column::Id"
    )]
    Order,
    /// Each item references one menu
    #[sea_orm(
        belongs_to = "super::menu::Entity",
        from = "Column::MenuId",
        to = "super::menu::Column::Id"
    )]
    Menu,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::menu::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Menu.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
