//! Idempotent loader - Persists grouped line items as orders and order items.
//!
//! For every group the loader makes sure the branch, category and menu rows exist,
//! then creates the order unless its natural key is already present. A duplicate is
//! a normal skip, not an error. Each write stands on its own: there is no transaction
//! spanning a file, so a failure keeps all earlier rows and a re-run skips them.

use crate::{
    core::{
        branch::get_or_create_branch,
        category::get_or_create_category,
        grouping::{OrderGroups, group_orders},
        menu::get_or_create_menu,
        order::{NewOrder, OrderOutcome, create_order_if_absent, create_order_item},
    },
    entities::branch,
    errors::{Error, Result},
    models::CanonicalRecord,
};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::ops::AddAssign;
use tracing::{debug, error, info, warn};

/// Group failures logged in full per file; later ones are only counted.
pub const MAX_LOGGED_GROUP_ERRORS: usize = 3;

/// Counters for one file or a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Orders created
    pub new_orders: usize,
    /// Groups whose natural key already existed
    pub skipped_orders: usize,
    /// Line items created
    pub new_items: usize,
    /// Line items dropped because their menu could not be resolved
    pub skipped_items: usize,
    /// Groups that failed with an error
    pub errors: usize,
}

impl AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.new_orders += other.new_orders;
        self.skipped_orders += other.skipped_orders;
        self.new_items += other.new_items;
        self.skipped_items += other.skipped_items;
        self.errors += other.errors;
    }
}

/// What happened to a single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// A new order was written with this many items
    Created {
        /// Items written
        items: usize,
        /// Items skipped for lack of a menu
        skipped_items: usize,
    },
    /// The order already existed and was left untouched
    Duplicate,
}

/// Loads groups for one branch, caching dimension IDs across groups and files.
pub struct Loader<'a> {
    db: &'a DatabaseConnection,
    branch: branch::Model,
    categories: HashMap<String, i64>,
    menus: HashMap<String, i64>,
}

impl<'a> Loader<'a> {
    /// Resolves (or creates) the branch and returns a loader bound to it.
    ///
    /// # Errors
    /// Returns an error if the branch row cannot be read or created.
    pub async fn new(
        db: &'a DatabaseConnection,
        branch_name: &str,
        area_type: &str,
    ) -> Result<Self> {
        let branch = get_or_create_branch(db, branch_name, area_type).await?;
        Ok(Self {
            db,
            branch,
            categories: HashMap::new(),
            menus: HashMap::new(),
        })
    }

    /// Groups `records` into orders and loads them. Group failures are counted and
    /// logged; they never abort the batch.
    pub async fn load_records(
        &mut self,
        source: &str,
        records: Vec<CanonicalRecord>,
    ) -> LoadStats {
        self.load_groups(source, group_orders(records)).await
    }

    /// Loads already grouped records.
    pub async fn load_groups(&mut self, source: &str, groups: OrderGroups) -> LoadStats {
        let mut stats = LoadStats::default();
        for (key, items) in groups {
            match self.load_group(&key, &items).await {
                Ok(GroupOutcome::Created {
                    items,
                    skipped_items,
                }) => {
                    stats.new_orders += 1;
                    stats.new_items += items;
                    stats.skipped_items += skipped_items;
                }
                Ok(GroupOutcome::Duplicate) => {
                    debug!("Order {} already loaded, skipping", key);
                    stats.skipped_orders += 1;
                }
                Err(e) => {
                    stats.errors += 1;
                    if stats.errors <= MAX_LOGGED_GROUP_ERRORS {
                        error!("Failed to load order {} from {}: {}", key, source, e);
                    }
                }
            }
        }
        if stats.errors > MAX_LOGGED_GROUP_ERRORS {
            warn!(
                "{} further group errors in {} not shown",
                stats.errors - MAX_LOGGED_GROUP_ERRORS,
                source
            );
        }
        info!(
            "Loaded {}: {} new orders, {} skipped (duplicate), {} new items, {} errors",
            source, stats.new_orders, stats.skipped_orders, stats.new_items, stats.errors
        );
        stats
    }

    /// Loads one order group.
    ///
    /// # Errors
    /// Returns an error if the group is empty, has no order date, or a store write fails.
    pub async fn load_group(
        &mut self,
        key: &str,
        items: &[CanonicalRecord],
    ) -> Result<GroupOutcome> {
        let first = items.first().ok_or_else(|| Error::InvalidRecord {
            message: format!("group {key} has no items"),
        })?;
        let order = NewOrder::from_record(first)?;

        // An unresolved menu only costs its own line items.
        for item in items {
            if let Err(e) = self.ensure_menu(item).await {
                warn!(
                    "Could not resolve menu '{}' for order {}: {}",
                    item.product_name, key, e
                );
            }
        }

        let created = match create_order_if_absent(self.db, self.branch.id, &order).await? {
            OrderOutcome::Created(created) => created,
            OrderOutcome::Duplicate { .. } => return Ok(GroupOutcome::Duplicate),
        };

        let mut written = 0;
        let mut skipped_items = 0;
        for item in items {
            let Some(menu_id) = self.menus.get(&item.product_name).copied() else {
                skipped_items += 1;
                warn!(
                    "Skipping item of order {}: {}",
                    key,
                    Error::MenuNotResolved {
                        name: item.product_name.clone()
                    }
                );
                continue;
            };
            create_order_item(self.db, created.id, menu_id, item).await?;
            written += 1;
        }
        Ok(GroupOutcome::Created {
            items: written,
            skipped_items,
        })
    }

    async fn ensure_menu(&mut self, item: &CanonicalRecord) -> Result<()> {
        if self.menus.contains_key(&item.product_name) {
            return Ok(());
        }
        let category_id = match self.categories.get(&item.category_name) {
            Some(id) => *id,
            None => {
                let category = get_or_create_category(self.db, &item.category_name).await?;
                self.categories.insert(item.category_name.clone(), category.id);
                category.id
            }
        };
        let menu =
            get_or_create_menu(self.db, &item.product_name, category_id, item.unit_price).await?;
        self.menus.insert(item.product_name.clone(), menu.id);
        Ok(())
    }
}
