//! Cell coercion rules.
//!
//! Financial columns in POS exports are often blank or carry formatting, so numeric
//! coercion never fails: anything unparsable becomes 0. Dates follow a three-way rule
//! (native date value, ISO-ish string, spreadsheet serial number).

use crate::models::RawCell;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Largest serial a spreadsheet can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Day zero of spreadsheet serial dates. 1899-12-30 absorbs the 1900 leap-year bug.
#[must_use]
pub fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Converts a serial day count (fraction = time of day) to a timestamp.
#[must_use]
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial <= 0.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = (serial * MILLIS_PER_DAY).round() as i64;
    excel_epoch().checked_add_signed(Duration::milliseconds(millis))
}

/// Parses an ISO-ish date or date-time string. `/` and `.` are accepted as date separators.
///
/// An RFC 3339 offset is dropped and the written wall-clock time is kept, so the business
/// day of the export never shifts.
#[must_use]
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_local());
    }

    let (date_part, time_part) = match text.find(['T', ' ']) {
        Some(split) => (&text[..split], text[split + 1..].trim()),
        None => (text, ""),
    };
    let date_part = date_part.trim_end_matches('.').replace(['/', '.'], "-");
    let date = NaiveDate::parse_from_str(&date_part, "%Y-%m-%d").ok()?;
    if time_part.is_empty() {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time_part, format).ok())
        .map(|time| date.and_time(time))
}

/// Coerces a date-like cell; `None` means the value is invalid or absent.
#[must_use]
pub fn coerce_date(cell: &RawCell) -> Option<NaiveDateTime> {
    match cell {
        RawCell::DateTime(value) => Some(*value),
        RawCell::Text(text) => parse_date_text(text),
        RawCell::Number(serial) | RawCell::DateSerial(serial) => excel_serial_to_datetime(*serial),
        RawCell::Empty | RawCell::Bool(_) => None,
    }
}

/// Coerces a numeric cell. Thousands separators, whitespace and the `원` suffix are
/// stripped; anything that still does not parse is 0.
#[must_use]
pub fn coerce_number(cell: &RawCell) -> f64 {
    let value = match cell {
        RawCell::Number(value) | RawCell::DateSerial(value) => *value,
        RawCell::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',' && *c != '원')
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
        RawCell::Empty | RawCell::Bool(_) | RawCell::DateTime(_) => 0.0,
    };
    if value.is_finite() { value } else { 0.0 }
}

/// Quantity is a whole number of at least 1.
#[must_use]
pub fn coerce_quantity(cell: &RawCell) -> u32 {
    let rounded = coerce_number(cell).round();
    if rounded < 1.0 {
        1
    } else if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let quantity = rounded as u32;
        quantity
    }
}

/// Cleans a text cell. Whole numbers render without a fractional part so numeric
/// order numbers read as `"1001"`, not `"1001.0"`.
#[must_use]
pub fn coerce_text(cell: &RawCell) -> String {
    match cell {
        RawCell::Empty => String::new(),
        RawCell::Text(text) => text.trim().to_string(),
        RawCell::Number(value) | RawCell::DateSerial(value) => {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                format!("{value:.0}")
            } else {
                value.to_string()
            }
        }
        RawCell::DateTime(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
        RawCell::Bool(value) => value.to_string(),
    }
}

/// Text coercion with a default for blank values.
#[must_use]
pub fn coerce_text_or(cell: &RawCell, default: &str) -> String {
    let text = coerce_text(cell);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use chrono::Datelike;
    use chrono::Timelike;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_number(&RawCell::Text("1,200".to_string())), 1200.0);
        assert_eq!(coerce_number(&RawCell::Number(1200.0)), 1200.0);
        assert_eq!(coerce_number(&RawCell::Text(String::new())), 0.0);
        assert_eq!(coerce_number(&RawCell::Empty), 0.0);
    }

    #[test]
    fn test_numeric_coercion_defaults_to_zero() {
        assert_eq!(coerce_number(&RawCell::Text("n/a".to_string())), 0.0);
        assert_eq!(coerce_number(&RawCell::Text(" 3,500원 ".to_string())), 3500.0);
        assert_eq!(coerce_number(&RawCell::Text("-500".to_string())), -500.0);
        assert_eq!(coerce_number(&RawCell::Bool(true)), 0.0);
        assert_eq!(coerce_number(&RawCell::Number(f64::NAN)), 0.0);
    }

    #[test]
    fn test_serial_and_iso_dates_agree() {
        let from_serial = coerce_date(&RawCell::Number(44927.0)).unwrap();
        let from_iso = coerce_date(&RawCell::Text("2023-01-01T00:00:00Z".to_string())).unwrap();
        assert_eq!(from_serial.date(), from_iso.date());
        assert_eq!(
            (from_serial.year(), from_serial.month(), from_serial.day()),
            (2023, 1, 1)
        );
    }

    #[test]
    fn test_serial_fraction_is_time_of_day() {
        let value = coerce_date(&RawCell::DateSerial(45413.5)).unwrap();
        assert_eq!(value.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!((value.hour(), value.minute()), (12, 0));
    }

    #[test]
    fn test_date_text_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        for text in [
            "2024-05-01",
            "2024/05/01",
            "2024.05.01",
            "2024-05-01 13:45:10",
            "2024-05-01T13:45",
        ] {
            let parsed = parse_date_text(text).unwrap();
            assert_eq!(parsed.date(), expected, "{text}");
        }
        assert_eq!(
            parse_date_text("2024-05-01 13:45:10").unwrap().second(),
            10
        );
    }

    #[test]
    fn test_offset_keeps_local_wall_clock() {
        let parsed = parse_date_text("2024-05-01T08:00:00+09:00").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!((parsed.hour(), parsed.minute()), (8, 0));

        let late = coerce_date(&RawCell::Text("2024-04-30T23:30:00+09:00".to_string())).unwrap();
        assert_eq!(late.date(), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(late.hour(), 23);
    }

    #[test]
    fn test_invalid_dates() {
        assert!(coerce_date(&RawCell::Text("yesterday".to_string())).is_none());
        assert!(coerce_date(&RawCell::Empty).is_none());
        assert!(coerce_date(&RawCell::Number(-3.0)).is_none());
        assert!(coerce_date(&RawCell::Bool(false)).is_none());
    }

    #[test]
    fn test_quantity_is_at_least_one() {
        assert_eq!(coerce_quantity(&RawCell::Number(2.6)), 3);
        assert_eq!(coerce_quantity(&RawCell::Number(0.0)), 1);
        assert_eq!(coerce_quantity(&RawCell::Text("-2".to_string())), 1);
        assert_eq!(coerce_quantity(&RawCell::Empty), 1);
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(coerce_text(&RawCell::Number(1001.0)), "1001");
        assert_eq!(coerce_text(&RawCell::Number(1.5)), "1.5");
        assert_eq!(coerce_text(&RawCell::Text("  Cola ".to_string())), "Cola");
        assert_eq!(coerce_text_or(&RawCell::Empty, "POS"), "POS");
        assert_eq!(coerce_text_or(&RawCell::Text("배달".to_string()), "POS"), "배달");
    }
}
