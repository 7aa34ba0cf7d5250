//! Extractor/normalizer - Turns a plaintext sales workbook into canonical records.
//!
//! Row 1 holds the headers and row 2 a descriptive line, so data starts at row 3.
//! This module is the only place that decides whether a row is well formed; rows that
//! are blank or lack an order number or product name are counted and dropped.

use crate::{
    core::{
        coerce::{
            coerce_date, coerce_number, coerce_quantity, coerce_text, coerce_text_or,
            parse_date_text,
        },
        header_map::{Field, HeaderMap, Target},
    },
    errors::{Error, Result},
    models::{CanonicalRecord, RawCell, RawRow},
};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::{debug, info, warn};

/// Rows at or above this 1-based index are header/description rows.
pub const LAST_PREAMBLE_ROW: usize = 2;

/// Only this many rejected rows are logged individually per workbook.
const MAX_LOGGED_INVALID_ROWS: usize = 5;

/// Channel used when the export leaves it blank.
pub const DEFAULT_CHANNEL: &str = "POS";
/// Payment status used when the export leaves it blank.
pub const DEFAULT_PAYMENT_STATUS: &str = "completed";
/// Category used when the export leaves it blank.
pub const DEFAULT_CATEGORY: &str = "uncategorized";
/// Tax type used when the export leaves it blank.
pub const DEFAULT_TAX_TYPE: &str = "taxable";

static EMPTY_CELL: RawCell = RawCell::Empty;

/// Outcome of extracting one worksheet.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    /// Worksheet the rows were read from
    pub sheet_name: String,
    /// Valid records in worksheet order
    pub records: Vec<CanonicalRecord>,
    /// Entirely blank data rows
    pub blank_rows: usize,
    /// Rows missing a required field
    pub invalid_rows: usize,
}

/// Why a data row did not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// Every cell is empty
    Blank,
    /// A required field is empty
    MissingField(Field),
}

/// Reads the sales worksheet of `path` and normalizes its rows.
///
/// Uses the sheet called `sheet_name` when present, otherwise the first sheet.
///
/// # Errors
/// Returns an error if the file is not a readable workbook, has no worksheets, or its
/// header row lacks the order number or product name column.
pub fn extract_workbook(
    path: &Path,
    sheet_name: &str,
    header_map: &HeaderMap,
) -> Result<ExtractReport> {
    let workbook_error = |message: String| Error::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names();
    let selected = if sheet_names.iter().any(|name| name == sheet_name) {
        sheet_name.to_string()
    } else {
        let first = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?;
        warn!(
            "Worksheet '{}' not found in {}, falling back to '{}'",
            sheet_name,
            path.display(),
            first
        );
        first
    };

    let range = workbook
        .worksheet_range(&selected)
        .map_err(|e| workbook_error(e.to_string()))?;
    let rows: Vec<Vec<RawCell>> = range
        .rows()
        .map(|row| row.iter().map(to_raw_cell).collect())
        .collect();

    let mut report = extract_rows(path, rows, header_map)?;
    report.sheet_name = selected;
    info!(
        "Extracted {} records from {} (sheet '{}', {} blank, {} invalid rows dropped)",
        report.records.len(),
        path.display(),
        report.sheet_name,
        report.blank_rows,
        report.invalid_rows
    );
    Ok(report)
}

/// Normalizes worksheet rows, the first of which is the header row.
///
/// # Errors
/// Returns [`Error::MissingColumns`] when the header row does not map both required fields.
pub fn extract_rows(
    path: &Path,
    rows: Vec<Vec<RawCell>>,
    header_map: &HeaderMap,
) -> Result<ExtractReport> {
    let mut rows = rows.into_iter();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(coerce_text).collect())
        .unwrap_or_default();

    let targets = header_map.resolve(&headers);
    let missing = HeaderMap::missing_required(&targets);
    if !missing.is_empty() {
        return Err(Error::MissingColumns {
            path: path.to_path_buf(),
            columns: missing.iter().map(ToString::to_string).collect(),
        });
    }

    let mut report = ExtractReport::default();
    // enumerate() starts after the header row, i.e. at row 2.
    for (offset, cells) in rows.enumerate() {
        let row_number = offset + 2;
        if row_number <= LAST_PREAMBLE_ROW {
            continue;
        }
        let raw = label_row(&targets, cells);
        match normalize_row(&raw) {
            Ok(record) => {
                debug!(
                    "Row {}: order {} / {}",
                    row_number, record.order_number, record.product_name
                );
                report.records.push(record);
            }
            Err(RowRejection::Blank) => report.blank_rows += 1,
            Err(RowRejection::MissingField(field)) => {
                report.invalid_rows += 1;
                if report.invalid_rows <= MAX_LOGGED_INVALID_ROWS {
                    warn!(
                        "Dropping row {} of {}: missing {}",
                        row_number,
                        path.display(),
                        field
                    );
                }
            }
        }
    }
    Ok(report)
}

/// Pairs each cell with the name of its column target. Short rows are padded with
/// empty cells; cells beyond the header row are ignored.
fn label_row(targets: &[Target], cells: Vec<RawCell>) -> RawRow {
    let mut cells = cells.into_iter();
    targets
        .iter()
        .map(|target| {
            let name = match target {
                Target::Field(field) => field.as_str().to_string(),
                Target::Passthrough(name) => name.clone(),
            };
            (name, cells.next().unwrap_or(RawCell::Empty))
        })
        .collect()
}

fn cell(row: &RawRow, field: Field) -> &RawCell {
    row.iter()
        .find(|(name, _)| name == field.as_str())
        .map_or(&EMPTY_CELL, |(_, cell)| cell)
}

/// Builds a canonical record from one labelled row.
///
/// # Errors
/// Rejects blank rows and rows whose order number or product name is empty.
pub fn normalize_row(row: &RawRow) -> std::result::Result<CanonicalRecord, RowRejection> {
    if row.iter().all(|(_, cell)| cell.is_blank()) {
        return Err(RowRejection::Blank);
    }

    let order_number = coerce_text(cell(row, Field::OrderNumber));
    if order_number.is_empty() {
        return Err(RowRejection::MissingField(Field::OrderNumber));
    }
    let product_name = coerce_text(cell(row, Field::ProductName));
    if product_name.is_empty() {
        return Err(RowRejection::MissingField(Field::ProductName));
    }

    let quantity = coerce_quantity(cell(row, Field::Quantity));
    let unit_price = coerce_number(cell(row, Field::UnitPrice));
    let option_price = coerce_number(cell(row, Field::OptionPrice));
    let product_discount = coerce_number(cell(row, Field::ProductDiscount));
    let order_discount = coerce_number(cell(row, Field::OrderDiscount));
    let mut actual_sales_amount = coerce_number(cell(row, Field::ActualSalesAmount));
    if actual_sales_amount == 0.0 {
        actual_sales_amount = (unit_price + option_price) * f64::from(quantity)
            - product_discount
            - order_discount;
    }
    let option_name = Some(coerce_text(cell(row, Field::OptionName))).filter(|s| !s.is_empty());

    let extra = row
        .iter()
        .filter(|(name, _)| name.parse::<Field>().is_err())
        .filter(|(_, cell)| !cell.is_blank())
        .map(|(name, cell)| (name.clone(), coerce_text(cell)))
        .collect();

    Ok(CanonicalRecord {
        order_base_date: coerce_date(cell(row, Field::OrderBaseDate)),
        order_number,
        order_start_time: coerce_date(cell(row, Field::OrderStartTime)),
        order_channel: coerce_text_or(cell(row, Field::OrderChannel), DEFAULT_CHANNEL),
        payment_status: coerce_text_or(cell(row, Field::PaymentStatus), DEFAULT_PAYMENT_STATUS),
        category_name: coerce_text_or(cell(row, Field::CategoryName), DEFAULT_CATEGORY),
        product_name,
        quantity,
        unit_price,
        option_name,
        option_price,
        product_discount,
        order_discount,
        actual_sales_amount,
        tax_type: coerce_text_or(cell(row, Field::TaxType), DEFAULT_TAX_TYPE),
        vat_amount: coerce_number(cell(row, Field::VatAmount)),
        extra,
    })
}

fn to_raw_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(text) | Data::DurationIso(text) => RawCell::Text(text.clone()),
        Data::Float(value) => RawCell::Number(*value),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Bool(value) => RawCell::Bool(*value),
        Data::DateTime(value) => RawCell::DateSerial(value.as_f64()),
        Data::DateTimeIso(text) => {
            parse_date_text(text).map_or_else(|| RawCell::Text(text.clone()), RawCell::DateTime)
        }
    }
}
