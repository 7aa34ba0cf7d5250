//! Run settings loaded from environment variables.
//!
//! `main` loads `.env` with `dotenvy` before calling [`Settings::from_env`], so values
//! can come from either place. Only `DATABASE_URL` is mandatory.

use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Default passphrase of protected POS exports.
pub const DEFAULT_EXCEL_PASSWORD: &str = "0000";
/// Default branch every order is booked against.
pub const DEFAULT_BRANCH_NAME: &str = "왕십리한양대점";
/// Default area classification of that branch.
pub const DEFAULT_BRANCH_AREA_TYPE: &str = "대학가";
/// Default input directory.
pub const DEFAULT_DATA_DIR: &str = "revenue-data";
/// Default name of the worksheet holding line items.
pub const DEFAULT_SALES_SHEET: &str = "상품 주문 상세내역";
/// Default location of the optional header alias file.
pub const DEFAULT_HEADER_MAP_PATH: &str = "ingest.toml";

/// Everything one pipeline run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Store connection string (`postgres://…` or `sqlite://…`)
    pub database_url: String,
    /// Passphrase for protected workbooks
    pub excel_password: String,
    /// Branch name
    pub branch_name: String,
    /// Branch area type
    pub branch_area_type: String,
    /// Input directory
    pub data_dir: PathBuf,
    /// Preferred worksheet name
    pub sales_sheet_name: String,
    /// Header alias file; ignored when it does not exist
    pub header_map_path: PathBuf,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    /// Returns [`Error::MissingConfig`] if `DATABASE_URL` is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as unset.
    ///
    /// # Errors
    /// Returns [`Error::MissingConfig`] if `DATABASE_URL` is unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = get("DATABASE_URL").ok_or_else(|| Error::MissingConfig {
            key: "DATABASE_URL".to_string(),
        })?;

        Ok(Self {
            database_url,
            excel_password: or_default("EXCEL_PASSWORD", DEFAULT_EXCEL_PASSWORD),
            branch_name: or_default("BRANCH_NAME", DEFAULT_BRANCH_NAME),
            branch_area_type: or_default("BRANCH_AREA_TYPE", DEFAULT_BRANCH_AREA_TYPE),
            data_dir: PathBuf::from(or_default("REVENUE_DATA_DIR", DEFAULT_DATA_DIR)),
            sales_sheet_name: or_default("SALES_SHEET_NAME", DEFAULT_SALES_SHEET),
            header_map_path: PathBuf::from(or_default("HEADER_MAP_PATH", DEFAULT_HEADER_MAP_PATH)),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let settings = Settings::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")])).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.excel_password, "0000");
        assert_eq!(settings.branch_name, "왕십리한양대점");
        assert_eq!(settings.branch_area_type, "대학가");
        assert_eq!(settings.data_dir, PathBuf::from("revenue-data"));
        assert_eq!(settings.sales_sheet_name, "상품 주문 상세내역");
        assert_eq!(settings.header_map_path, PathBuf::from("ingest.toml"));
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://pos@localhost/sales"),
            ("EXCEL_PASSWORD", "1234"),
            ("BRANCH_NAME", "신촌점"),
            ("REVENUE_DATA_DIR", "/data/pos"),
        ]))
        .unwrap();
        assert_eq!(settings.excel_password, "1234");
        assert_eq!(settings.branch_name, "신촌점");
        assert_eq!(settings.data_dir, PathBuf::from("/data/pos"));
    }

    #[test]
    fn test_missing_or_blank_database_url_is_fatal() {
        let missing = Settings::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(missing, Error::MissingConfig { key } if key == "DATABASE_URL"));

        let blank = Settings::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert!(matches!(blank, Error::MissingConfig { .. }));
    }
}
