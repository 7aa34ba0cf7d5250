//! Category business logic - Lazily creates categories seen on line items.

use crate::{
    core::is_unique_violation,
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::debug;

/// Finds a category by its unique name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the category called `name`, creating it on first sight.
///
/// # Errors
/// Returns an error if the name is blank or the store rejects the query.
pub async fn get_or_create_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Category name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_category_by_name(db, name).await? {
        return Ok(existing);
    }

    let now = chrono::Utc::now().naive_utc();
    let category = category::ActiveModel {
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    match category.insert(db).await {
        Ok(created) => {
            debug!("Created category '{}'", created.name);
            Ok(created)
        }
        Err(e) if is_unique_violation(&e) => get_category_by_name(db, name)
            .await?
            .ok_or_else(|| Error::Database(e)),
        Err(e) => Err(e.into()),
    }
}
