/// Database connection and schema creation
pub mod database;

/// Header alias file loading from ingest.toml
pub mod headers;

/// Run settings from environment variables
pub mod settings;
