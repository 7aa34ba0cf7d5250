//! Archiver - Moves a loaded file out of the pending set.
//!
//! Archiving is independent of the load itself: a failure here leaves the file pending,
//! and the next run reloads it as a no-op because every order is already present.

use crate::errors::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Moves `processed` to `archived`, replacing an older archive of the same name.
///
/// Falls back to copy-then-delete when a rename is not possible (e.g. across devices).
pub fn archive_file(processed: &Path, archived: &Path) -> Result<PathBuf> {
    if let Some(parent) = archived.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(processed, archived).is_err() {
        fs::copy(processed, archived)?;
        fs::remove_file(processed)?;
    }
    info!("Archived {} -> {}", processed.display(), archived.display());
    Ok(archived.to_path_buf())
}
