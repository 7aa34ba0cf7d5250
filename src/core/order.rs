//! Order business logic - Create-or-skip for orders and one-shot creation of line items.
//!
//! An order is identified by (branch, order number, order date). If a row with that key
//! exists the import is a duplicate and nothing about the existing order is touched.
//! Orders and items are append-only: nothing here updates or deletes.

use crate::{
    core::is_unique_violation,
    entities::{OrderItem, SalesOrder, order_item, sales_order},
    errors::{Error, Result},
    models::CanonicalRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Header fields of an order derived from its first line item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// POS order number
    pub order_number: String,
    /// Business day, part of the natural key
    pub order_date: NaiveDate,
    /// Full order timestamp
    pub ordered_at: NaiveDateTime,
    /// Sales channel
    pub order_channel: String,
    /// Payment status
    pub order_status: String,
}

impl NewOrder {
    /// Builds the order header from a grouped line item.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRecord`] when the record has no usable date.
    pub fn from_record(record: &CanonicalRecord) -> Result<Self> {
        let ordered_at = record
            .order_timestamp()
            .ok_or_else(|| Error::InvalidRecord {
                message: format!("order {} has no order date", record.order_number),
            })?;
        Ok(Self {
            order_number: record.order_number.clone(),
            order_date: ordered_at.date(),
            ordered_at,
            order_channel: record.order_channel.clone(),
            order_status: record.payment_status.clone(),
        })
    }
}

/// Result of trying to create an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOutcome {
    /// No order had this natural key; the new row is returned
    Created(sales_order::Model),
    /// An order with this natural key already exists
    Duplicate {
        /// ID of the existing order
        existing_id: i64,
    },
}

/// Looks up an order by its natural key.
pub async fn find_order_by_natural_key(
    db: &DatabaseConnection,
    branch_id: i64,
    order_number: &str,
    order_date: NaiveDate,
) -> Result<Option<sales_order::Model>> {
    SalesOrder::find()
        .filter(sales_order::Column::BranchId.eq(branch_id))
        .filter(sales_order::Column::OrderNumber.eq(order_number))
        .filter(sales_order::Column::OrderDate.eq(order_date))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates the order unless its natural key is already taken.
///
/// The lookup handles the common re-import case; the unique index is what finally
/// decides, so an insert conflict is also reported as [`OrderOutcome::Duplicate`].
pub async fn create_order_if_absent(
    db: &DatabaseConnection,
    branch_id: i64,
    order: &NewOrder,
) -> Result<OrderOutcome> {
    if let Some(existing) =
        find_order_by_natural_key(db, branch_id, &order.order_number, order.order_date).await?
    {
        return Ok(OrderOutcome::Duplicate {
            existing_id: existing.id,
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let model = sales_order::ActiveModel {
        order_number: Set(order.order_number.clone()),
        branch_id: Set(branch_id),
        order_date: Set(order.order_date),
        ordered_at: Set(order.ordered_at),
        order_channel: Set(order.order_channel.clone()),
        order_status: Set(order.order_status.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    match model.insert(db).await {
        Ok(created) => Ok(OrderOutcome::Created(created)),
        Err(e) if is_unique_violation(&e) => {
            let existing =
                find_order_by_natural_key(db, branch_id, &order.order_number, order.order_date)
                    .await?
                    .ok_or_else(|| Error::Database(e))?;
            Ok(OrderOutcome::Duplicate {
                existing_id: existing.id,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Creates one line item for `order_id`.
pub async fn create_order_item(
    db: &DatabaseConnection,
    order_id: i64,
    menu_id: i64,
    record: &CanonicalRecord,
) -> Result<order_item::Model> {
    let now = chrono::Utc::now().naive_utc();
    let item = order_item::ActiveModel {
        order_id: Set(order_id),
        menu_id: Set(menu_id),
        quantity: Set(i32::try_from(record.quantity).unwrap_or(i32::MAX)),
        unit_price: Set(record.unit_price),
        option_name: Set(record.option_name.clone()),
        option_price: Set(record.option_price),
        product_discount: Set(record.product_discount),
        order_discount: Set(record.order_discount),
        total_amount: Set(record.actual_sales_amount),
        tax_type: Set(record.tax_type.clone()),
        vat_amount: Set(record.vat_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Retrieves the line items of an order in insertion order.
pub async fn get_items_for_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, PaginatorTrait};

    #[tokio::test]
    async fn test_second_create_is_duplicate() -> Result<()> {
        let (db, branch) = setup_with_branch().await?;
        let record = dated_record("A100", "Cola", at(2024, 5, 1, 12));
        let order = NewOrder::from_record(&record)?;

        let first = create_order_if_absent(&db, branch.id, &order).await?;
        let OrderOutcome::Created(created) = first else {
            panic!("expected a new order");
        };
        let second = create_order_if_absent(&db, branch.id, &order).await?;

        assert_eq!(
            second,
            OrderOutcome::Duplicate {
                existing_id: created.id
            }
        );
        assert_eq!(SalesOrder::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_same_number_on_another_day_is_new() -> Result<()> {
        let (db, branch) = setup_with_branch().await?;
        let monday = NewOrder::from_record(&dated_record("A100", "Cola", at(2024, 5, 6, 9)))?;
        let tuesday = NewOrder::from_record(&dated_record("A100", "Cola", at(2024, 5, 7, 9)))?;

        create_order_if_absent(&db, branch.id, &monday).await?;
        let outcome = create_order_if_absent(&db, branch.id, &tuesday).await?;

        assert!(matches!(outcome, OrderOutcome::Created(_)));
        assert_eq!(SalesOrder::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unique_index_rejects_direct_duplicate_insert() -> Result<()> {
        let (db, branch) = setup_with_branch().await?;
        let order = NewOrder::from_record(&dated_record("A100", "Cola", at(2024, 5, 1, 12)))?;
        create_order_if_absent(&db, branch.id, &order).await?;

        // Bypass the lookup and insert the same natural key directly.
        let now = chrono::Utc::now().naive_utc();
        let duplicate = sales_order::ActiveModel {
            order_number: Set(order.order_number.clone()),
            branch_id: Set(branch.id),
            order_date: Set(order.order_date),
            ordered_at: Set(order.ordered_at),
            order_channel: Set("POS".to_string()),
            order_status: Set("completed".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let err = duplicate.insert(&db).await.unwrap_err();

        assert!(is_unique_violation(&err));
        assert_eq!(SalesOrder::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_order_item_copies_amounts() -> Result<()> {
        let (db, branch) = setup_with_branch().await?;
        let mut record = dated_record("A100", "Cola", at(2024, 5, 1, 12));
        record.quantity = 2;
        record.unit_price = 1000.0;
        record.product_discount = 100.0;
        record.actual_sales_amount = 1900.0;
        record.option_name = Some("Large".to_string());

        let OrderOutcome::Created(order) =
            create_order_if_absent(&db, branch.id, &NewOrder::from_record(&record)?).await?
        else {
            panic!("expected a new order");
        };
        let menu = create_test_menu(&db, "Cola", "Drink", 1000.0).await?;
        create_order_item(&db, order.id, menu.id, &record).await?;

        let items = get_items_for_order(&db, order.id).await?;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].total_amount, 1900.0);
        assert_eq!(items[0].product_discount, 100.0);
        assert_eq!(items[0].option_name.as_deref(), Some("Large"));
        assert_eq!(items[0].tax_type, "taxable");
        Ok(())
    }

    #[test]
    fn test_order_without_date_is_invalid() {
        let mut record = sample_record("A100", "Cola");
        record.order_start_time = None;
        record.order_base_date = None;
        assert!(matches!(
            NewOrder::from_record(&record).unwrap_err(),
            Error::InvalidRecord { .. }
        ));
    }
}
