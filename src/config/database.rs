//! Database configuration module for the sales store.
//!
//! Handles the connection and table creation using `SeaORM`. Tables are generated from the
//! entity definitions with `Schema::create_table_from_entity`, so the schema always matches
//! the Rust structs. Creation is idempotent: every statement uses `IF NOT EXISTS`, and each
//! run calls [`create_tables`] before loading.

use crate::entities::{Branch, Category, Menu, OrderItem, SalesOrder, sales_order};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

/// Name of the unique index over the order natural key.
pub const ORDER_NATURAL_KEY_INDEX: &str = "idx_orders_natural_key";

/// Opens a connection pool for `database_url` (`postgres://…` or `sqlite://…`).
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    info!("Connected to {:?} store", db.get_database_backend());
    Ok(db)
}

/// Creates all tables and the order natural-key index if they do not exist yet.
///
/// Dimension tables come first so foreign keys on orders and items resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(Branch),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Menu),
        schema.create_table_from_entity(SalesOrder),
        schema.create_table_from_entity(OrderItem),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    let natural_key = Index::create()
        .name(ORDER_NATURAL_KEY_INDEX)
        .table(SalesOrder)
        .col(sales_order::Column::BranchId)
        .col(sales_order::Column::OrderNumber)
        .col(sales_order::Column::OrderDate)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&natural_key)).await?;

    Ok(())
}
