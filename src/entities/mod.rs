//! Entity module - Contains all SeaORM entity definitions for the sales store.
//! Branch, category and menu are dimension tables shared by many rows; orders and
//! order items are the append-only fact tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod branch;
pub mod category;
pub mod menu;
pub mod order_item;
pub mod sales_order;

// Re-export specific types to avoid conflicts
pub use branch::{Column as BranchColumn, Entity as Branch, Model as BranchModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use menu::{Column as MenuColumn, Entity as Menu, Model as MenuModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use sales_order::{Column as SalesOrderColumn, Entity as SalesOrder, Model as SalesOrderModel};
