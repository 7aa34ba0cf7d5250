//! Menu business logic - Creates menus from the first line item that names them.
//!
//! The first-seen unit price becomes the base price, clamped to zero. Menus are never
//! re-priced or moved between categories by later imports.

use crate::{
    core::is_unique_violation,
    entities::{Menu, menu},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Finds a menu by its unique name.
pub async fn get_menu_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<menu::Model>> {
    Menu::find()
        .filter(menu::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the menu called `name`, creating it under `category_id` when absent.
///
/// # Errors
/// Returns an error if the name is blank or the store rejects the query.
pub async fn get_or_create_menu(
    db: &DatabaseConnection,
    name: &str,
    category_id: i64,
    unit_price: f64,
) -> Result<menu::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Menu name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_menu_by_name(db, name).await? {
        return Ok(existing);
    }

    let base_price = if unit_price.is_finite() {
        unit_price.max(0.0)
    } else {
        0.0
    };
    let now = chrono::Utc::now().naive_utc();
    let menu = menu::ActiveModel {
        name: Set(name.to_string()),
        category_id: Set(category_id),
        base_price: Set(base_price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    match menu.insert(db).await {
        Ok(created) => {
            debug!("Created menu '{}' at {}", created.name, created.base_price);
            Ok(created)
        }
        Err(e) if is_unique_violation(&e) => get_menu_by_name(db, name)
            .await?
            .ok_or_else(|| Error::Database(e)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::category::get_or_create_category;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_first_seen_price_wins() -> Result<()> {
        let db = setup_test_db().await?;
        let drink = get_or_create_category(&db, "Drink").await?;

        let first = get_or_create_menu(&db, "Cola", drink.id, 1000.0).await?;
        let second = get_or_create_menu(&db, "Cola", drink.id, 1500.0).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.base_price, 1000.0);
        assert_eq!(second.category_id, drink.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_price_is_clamped() -> Result<()> {
        let db = setup_test_db().await?;
        let drink = get_or_create_category(&db, "Drink").await?;

        let refund = get_or_create_menu(&db, "Refund Cola", drink.id, -1000.0).await?;
        assert_eq!(refund.base_price, 0.0);
        Ok(())
    }
}
