//! Branch business logic - Resolves the configured branch row.
//!
//! A run books every order against a single branch. The row is created the first time
//! the branch name is seen and only looked up afterwards.

use crate::{
    core::is_unique_violation,
    entities::{Branch, branch},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Finds a branch by its unique name.
pub async fn get_branch_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<branch::Model>> {
    Branch::find()
        .filter(branch::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the branch called `name`, creating it with `area_type` when absent.
///
/// An existing branch keeps its stored area type. A unique-constraint conflict on insert
/// means another writer created the row first, so it is read back instead of failing.
///
/// # Errors
/// Returns an error if the name is blank or the store rejects the query.
pub async fn get_or_create_branch(
    db: &DatabaseConnection,
    name: &str,
    area_type: &str,
) -> Result<branch::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Branch name cannot be empty".to_string(),
        });
    }

    if let Some(existing) = get_branch_by_name(db, name).await? {
        return Ok(existing);
    }

    let now = chrono::Utc::now().naive_utc();
    let branch = branch::ActiveModel {
        name: Set(name.to_string()),
        area_type: Set(area_type.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    match branch.insert(db).await {
        Ok(created) => {
            info!("Created branch '{}' (id {})", created.name, created.id);
            Ok(created)
        }
        Err(e) if is_unique_violation(&e) => get_branch_by_name(db, name)
            .await?
            .ok_or_else(|| Error::Database(e)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_get_or_create_branch_creates_once() -> Result<()> {
        let db = setup_test_db().await?;

        let first = get_or_create_branch(&db, "왕십리한양대점", "대학가").await?;
        let second = get_or_create_branch(&db, " 왕십리한양대점 ", "오피스").await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.area_type, "대학가");
        assert_eq!(Branch::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_branch_name_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = get_or_create_branch(&db, "   ", "대학가").await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));
        Ok(())
    }
}
