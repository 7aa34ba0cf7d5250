//! In-memory record types that flow between pipeline stages.
//!
//! [`RawRow`] lives only inside the extractor; [`CanonicalRecord`] is what the extractor
//! emits, what `processed/<name>.json` files hold, and what the loader consumes.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single spreadsheet cell before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// No value
    Empty,
    /// Plain or rich text
    Text(String),
    /// Any numeric cell that is not formatted as a date
    Number(f64),
    /// Numeric cell formatted as a date: days since 1899-12-30, fraction is time of day
    DateSerial(f64),
    /// Cell already carrying a date/time value
    DateTime(NaiveDateTime),
    /// Boolean cell
    Bool(bool),
}

impl RawCell {
    /// True when the cell carries nothing or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// One worksheet row as ordered (header, cell) pairs, in column order.
pub type RawRow = Vec<(String, RawCell)>;

/// One validated, type-coerced sold line item.
///
/// `order_number` and `product_name` are never empty and `quantity` is at least 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Business day the POS books the order under
    pub order_base_date: Option<NaiveDateTime>,
    /// POS order number
    pub order_number: String,
    /// Moment the order was opened
    pub order_start_time: Option<NaiveDateTime>,
    /// Sales channel, `"POS"` when blank
    pub order_channel: String,
    /// Payment status, `"completed"` when blank
    pub payment_status: String,
    /// Category name, `"uncategorized"` when blank
    pub category_name: String,
    /// Product name
    pub product_name: String,
    /// Units sold
    pub quantity: u32,
    /// Unit price
    pub unit_price: f64,
    /// Selected option, if any
    pub option_name: Option<String>,
    /// Option surcharge
    pub option_price: f64,
    /// Product-level discount
    pub product_discount: f64,
    /// Order-level discount share
    pub order_discount: f64,
    /// Realized sales amount of the line
    pub actual_sales_amount: f64,
    /// Tax classification, `"taxable"` when blank
    pub tax_type: String,
    /// VAT amount
    pub vat_amount: f64,
    /// Columns the header dictionary does not know, keyed by their raw header
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl CanonicalRecord {
    /// Timestamp that dates the order: start time if present, otherwise the base date.
    #[must_use]
    pub fn order_timestamp(&self) -> Option<NaiveDateTime> {
        self.order_start_time.or(self.order_base_date)
    }

    /// Calendar date used for grouping and for the order natural key.
    #[must_use]
    pub fn order_date(&self) -> Option<NaiveDate> {
        self.order_timestamp().map(|ts| ts.date())
    }
}
