//! Shared test utilities for the ingestion pipeline.
//!
//! This module provides helpers for setting up in-memory stores, building canonical
//! records with sensible defaults, and authoring small fixture workbooks.

use crate::{
    core::{branch, category, menu},
    entities,
    errors::{Error, Result},
    models::CanonicalRecord,
};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::Workbook;
use sea_orm::DatabaseConnection;
use std::collections::BTreeMap;
use std::path::Path;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all store tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a store with the default test branch.
/// Returns (db, branch) for order-level tests.
pub async fn setup_with_branch() -> Result<(DatabaseConnection, entities::branch::Model)> {
    let db = setup_test_db().await?;
    let branch = branch::get_or_create_branch(&db, "왕십리한양대점", "대학가").await?;
    Ok((db, branch))
}

/// Creates a menu (and its category, if needed) with the given base price.
pub async fn create_test_menu(
    db: &DatabaseConnection,
    name: &str,
    category_name: &str,
    price: f64,
) -> Result<entities::menu::Model> {
    let category = category::get_or_create_category(db, category_name).await?;
    menu::get_or_create_menu(db, name, category.id, price).await
}

/// Shorthand for a whole-hour timestamp.
///
/// # Panics
/// Panics on an invalid calendar date or hour.
#[allow(clippy::unwrap_used)]
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// Builds a valid record with sensible defaults.
///
/// # Defaults
/// * start time: 2024-05-01 10:00
/// * category: "Drink"
/// * quantity: 1 at 1000.0, realized amount 1000.0
/// * channel / status / tax type: "POS" / "completed" / "taxable"
pub fn sample_record(order_number: &str, product_name: &str) -> CanonicalRecord {
    CanonicalRecord {
        order_base_date: None,
        order_number: order_number.to_string(),
        order_start_time: Some(at(2024, 5, 1, 10)),
        order_channel: "POS".to_string(),
        payment_status: "completed".to_string(),
        category_name: "Drink".to_string(),
        product_name: product_name.to_string(),
        quantity: 1,
        unit_price: 1000.0,
        option_name: None,
        option_price: 0.0,
        product_discount: 0.0,
        order_discount: 0.0,
        actual_sales_amount: 1000.0,
        tax_type: "taxable".to_string(),
        vat_amount: 0.0,
        extra: BTreeMap::new(),
    }
}

/// Builds a record opened at `start_time`.
pub fn dated_record(
    order_number: &str,
    product_name: &str,
    start_time: NaiveDateTime,
) -> CanonicalRecord {
    CanonicalRecord {
        order_start_time: Some(start_time),
        ..sample_record(order_number, product_name)
    }
}

/// The reference scenario: two Cola lines on order A100 and one Beer line on A101,
/// all on 2024-05-01 and all in "Drink".
pub fn scenario_records() -> Vec<CanonicalRecord> {
    let beer = CanonicalRecord {
        unit_price: 5000.0,
        actual_sales_amount: 5000.0,
        ..dated_record("A101", "Beer", at(2024, 5, 1, 13))
    };
    vec![
        dated_record("A100", "Cola", at(2024, 5, 1, 12)),
        dated_record("A100", "Cola", at(2024, 5, 1, 12)),
        beer,
    ]
}

/// Header row used by [`write_scenario_workbook`].
pub const SCENARIO_HEADERS: [&str; 8] = [
    "주문기준일자",
    "주문번호",
    "주문시작시각",
    "카테고리",
    "상품명",
    "수량",
    "상품가격",
    "실판매금액",
];

/// Writes a plain `.xlsx` export of the reference scenario to `path`, including the
/// description line POS exports carry in row 2.
pub fn write_scenario_workbook(path: &Path, sheet_name: &str) -> Result<()> {
    let rows: [[&str; 5]; 3] = [
        ["A100", "2024-05-01 12:00:00", "Drink", "Cola", "1000"],
        ["A100", "2024-05-01 12:00:00", "Drink", "Cola", "1000"],
        ["A101", "2024-05-01 13:00:00", "Drink", "Beer", "5000"],
    ];
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| Error::Io(std::io::Error::other(e.to_string()));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(xlsx_err)?;
    for (col, header) in (0u16..).zip(SCENARIO_HEADERS) {
        sheet.write_string(0, col, header).map_err(xlsx_err)?;
    }
    sheet
        .write_string(1, 0, "상품 주문 상세내역 (2024-05-01 ~ 2024-05-01)")
        .map_err(xlsx_err)?;
    for (row, [order, started, category, product, price]) in (2u32..).zip(rows) {
        sheet.write_number(row, 0, 45413.0).map_err(xlsx_err)?;
        sheet.write_string(row, 1, order).map_err(xlsx_err)?;
        sheet.write_string(row, 2, started).map_err(xlsx_err)?;
        sheet.write_string(row, 3, category).map_err(xlsx_err)?;
        sheet.write_string(row, 4, product).map_err(xlsx_err)?;
        sheet.write_number(row, 5, 1.0).map_err(xlsx_err)?;
        sheet.write_string(row, 6, price).map_err(xlsx_err)?;
        sheet.write_string(row, 7, price).map_err(xlsx_err)?;
    }
    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}
