//! Order entity - One customer order at a branch.
//!
//! Orders are identified by the natural key (`branch_id`, `order_number`, `order_date`),
//! enforced by the `idx_orders_natural_key` unique index created alongside the table.
//! Rows are written once and never updated by the pipeline.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// POS order number; only unique per branch and business day
    pub order_number: String,
    /// ID of the branch the order was taken at
    pub branch_id: i64,
    /// Business day of the order
    pub order_date: Date,
    /// Full order start timestamp (midnight of `order_date` when the export lacks one)
    pub ordered_at: DateTime,
    /// Sales channel, e.g. `"POS"`
    pub order_channel: String,
    /// Payment status as exported, e.g. `"completed"`
    pub order_status: String,
    /// When the order row was created
    pub created_at: DateTime,
    /// When the order row was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one branch
    #[sea_orm(
        belongs_to = "super::branch::Entity",
        from = "Column::BranchId",
        to = "super::branch::Column::Id"
    )]
    Branch,
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::branch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branch.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
