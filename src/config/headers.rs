//! Header alias file loading.
//!
//! POS vendors occasionally rename columns. Extra aliases live in a TOML file:
//!
//! ```toml
//! [aliases]
//! "주문 번호" = "orderNumber"
//! "판매금액" = "actualSalesAmount"
//! ```
//!
//! Entries are merged over the built-in dictionary.

use crate::core::header_map::{Field, HeaderMap};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Structure of the alias file.
#[derive(Debug, Default, Deserialize)]
pub struct HeaderConfig {
    /// Header text → canonical field name
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

/// Parses alias file content and merges it over the built-in dictionary.
///
/// # Errors
/// Returns [`Error::Config`] on invalid TOML or an unknown field name.
pub fn parse_header_map(contents: &str) -> Result<HeaderMap> {
    let config: HeaderConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse header alias file: {e}"),
    })?;

    let mut map = HeaderMap::default();
    for (header, field) in &config.aliases {
        let field: Field = field.parse()?;
        map.insert_alias(header, field);
    }
    Ok(map)
}

/// Loads the alias file at `path`, or the built-in dictionary when there is none.
///
/// # Errors
/// Returns [`Error::Config`] when the file exists but cannot be read or parsed.
pub fn load_header_map(path: &Path) -> Result<HeaderMap> {
    if !path.is_file() {
        debug!("No header alias file at {}, using built-in aliases", path.display());
        return Ok(HeaderMap::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read {}: {e}", path.display()),
    })?;
    let map = parse_header_map(&contents)?;
    info!("Loaded header aliases from {}", path.display());
    Ok(map)
}
