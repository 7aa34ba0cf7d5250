//! Order grouper - Collects line items that belong to the same physical order.
//!
//! The key is `orderNumber + "_" + date`, because POS order numbers restart and
//! recur across business days.

use crate::models::CanonicalRecord;
use std::collections::BTreeMap;

/// Date part used when a record carries neither a start time nor a base date.
pub const UNKNOWN_DATE: &str = "unknown-date";

/// Line items of one file keyed by their grouping key.
pub type OrderGroups = BTreeMap<String, Vec<CanonicalRecord>>;

/// Grouping key of a single record.
#[must_use]
pub fn group_key(record: &CanonicalRecord) -> String {
    let date = record
        .order_date()
        .map_or_else(|| UNKNOWN_DATE.to_string(), |date| date.format("%Y-%m-%d").to_string());
    format!("{}_{}", record.order_number, date)
}

/// Groups records by [`group_key`]. Items keep their file order within a group.
#[must_use]
pub fn group_orders(records: Vec<CanonicalRecord>) -> OrderGroups {
    let mut groups = OrderGroups::new();
    for record in records {
        groups.entry(group_key(&record)).or_default().push(record);
    }
    groups
}
