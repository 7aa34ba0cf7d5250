//! Unified error type for the ingestion pipeline.
//!
//! Fatal conditions (missing configuration, missing input directory) surface from `main`
//! and end the run. Everything else is raised at file or group granularity and caught by
//! the stage loops in [`crate::core::pipeline`] and [`crate::core::loader`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is absent or blank.
    #[error("Missing required configuration: {key}")]
    MissingConfig {
        /// Name of the environment variable
        key: String,
    },

    /// Configuration present but unusable.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// The configured input directory does not exist.
    #[error("Input directory does not exist: {}", path.display())]
    DirectoryMissing {
        /// Directory that was expected
        path: PathBuf,
    },

    /// A protected workbook could not be decrypted.
    #[error("Failed to decrypt {}: {message}", path.display())]
    Decryption {
        /// Source workbook
        path: PathBuf,
        /// Underlying decryptor message
        message: String,
    },

    /// A workbook could not be opened or has no usable worksheet.
    #[error("Unreadable workbook {}: {message}", path.display())]
    Workbook {
        /// Workbook path
        path: PathBuf,
        /// Underlying reader message
        message: String,
    },

    /// The header row lacks columns every record needs.
    #[error("Workbook {} is missing required columns: {}", path.display(), columns.join(", "))]
    MissingColumns {
        /// Workbook path
        path: PathBuf,
        /// Canonical names of the absent fields
        columns: Vec<String>,
    },

    /// A record cannot be turned into an order.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// What is wrong with the record
        message: String,
    },

    /// A line item references a product with no menu row.
    #[error("Menu not resolved for product '{name}'")]
    MenuNotResolved {
        /// Product name as it appeared on the line item
        name: String,
    },

    /// Store error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Processed-file (de)serialisation error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
