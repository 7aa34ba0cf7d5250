//! Source locator - Finds the files each stage still has to handle.
//!
//! Layout under the input directory:
//! - `<name>.xlsx` raw exports, usually password protected
//! - `<name>-decrypted.xlsx` plaintext working copies
//! - `processed/<name>.json` normalized records waiting to be loaded
//! - `archived/<name>.json` loaded files, never picked up again
//!
//! Listing is read-only.

use crate::errors::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the file stem of a decrypted working copy.
pub const DECRYPTED_SUFFIX: &str = "-decrypted";
/// Subdirectory holding normalized JSON awaiting load.
pub const PROCESSED_DIR: &str = "processed";
/// Subdirectory holding loaded JSON.
pub const ARCHIVED_DIR: &str = "archived";

const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

/// Paths of the input directory and its derived locations.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Wraps the configured input directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of processed JSON files.
    #[must_use]
    pub fn processed_dir(&self) -> PathBuf {
        self.root.join(PROCESSED_DIR)
    }

    /// Directory of archived JSON files.
    #[must_use]
    pub fn archived_dir(&self) -> PathBuf {
        self.root.join(ARCHIVED_DIR)
    }

    /// Fails with [`Error::DirectoryMissing`] unless the input directory exists.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::DirectoryMissing {
                path: self.root.clone(),
            })
        }
    }

    /// `<stem>-decrypted.<ext>` next to the raw export.
    #[must_use]
    pub fn decrypted_path_for(&self, raw: &Path) -> PathBuf {
        let stem = file_stem(raw);
        let name = match raw.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{stem}{DECRYPTED_SUFFIX}.{ext}"),
            None => format!("{stem}{DECRYPTED_SUFFIX}"),
        };
        raw.with_file_name(name)
    }

    /// `processed/<name>.json` for a decrypted working copy.
    #[must_use]
    pub fn processed_path_for(&self, decrypted: &Path) -> PathBuf {
        self.processed_dir().join(format!("{}.json", source_name(decrypted)))
    }

    /// `archived/<name>.json` for a processed file.
    #[must_use]
    pub fn archived_path_for(&self, processed: &Path) -> PathBuf {
        self.archived_dir()
            .join(processed.file_name().unwrap_or(processed.as_os_str()))
    }

    /// Raw exports that have no decrypted working copy yet.
    pub fn find_encrypted_inputs(&self) -> Result<Vec<PathBuf>> {
        self.ensure_exists()?;
        let mut found: Vec<PathBuf> = list_files(&self.root)?
            .into_iter()
            .filter(|path| is_workbook(path) && !is_decrypted(path))
            .filter(|path| !self.decrypted_path_for(path).exists())
            .collect();
        found.sort();
        Ok(found)
    }

    /// Decrypted working copies that have not been extracted or loaded yet.
    pub fn find_decrypted_pending(&self) -> Result<Vec<PathBuf>> {
        self.ensure_exists()?;
        let mut found: Vec<PathBuf> = list_files(&self.root)?
            .into_iter()
            .filter(|path| is_workbook(path) && is_decrypted(path))
            .filter(|path| {
                let processed = self.processed_path_for(path);
                !processed.exists() && !self.archived_path_for(&processed).exists()
            })
            .collect();
        found.sort();
        Ok(found)
    }

    /// Processed JSON files waiting to be loaded.
    pub fn find_processed_pending(&self) -> Result<Vec<PathBuf>> {
        self.ensure_exists()?;
        let dir = self.processed_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut found: Vec<PathBuf> = list_files(&dir)?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        found.sort();
        Ok(found)
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if !is_temporary(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Hidden files, Office lock files (`~$…`) and partial writes.
fn is_temporary(path: &Path) -> bool {
    let name = file_name(path);
    name.starts_with('.') || name.starts_with("~$") || name.ends_with(".tmp")
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn is_decrypted(path: &Path) -> bool {
    file_stem(path).ends_with(DECRYPTED_SUFFIX)
}

/// Export name shared by every derivative: the stem without the decrypted suffix.
fn source_name(path: &Path) -> String {
    let stem = file_stem(path);
    stem.strip_suffix(DECRYPTED_SUFFIX)
        .map_or_else(|| stem.clone(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, b"x")?;
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let layout = DataLayout::new("/definitely/not/here/revenue-data");
        assert!(matches!(
            layout.find_encrypted_inputs(),
            Err(Error::DirectoryMissing { .. })
        ));
    }

    #[test]
    fn test_derived_paths() {
        let layout = DataLayout::new("revenue-data");
        let raw = Path::new("revenue-data/2024-05.xlsx");
        let decrypted = layout.decrypted_path_for(raw);
        assert_eq!(decrypted, Path::new("revenue-data/2024-05-decrypted.xlsx"));

        let processed = layout.processed_path_for(&decrypted);
        assert_eq!(processed, Path::new("revenue-data/processed/2024-05.json"));
        assert_eq!(
            layout.archived_path_for(&processed),
            Path::new("revenue-data/archived/2024-05.json")
        );
    }

    #[test]
    fn test_encrypted_inputs_skip_lock_files_and_derivatives() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = DataLayout::new(dir.path());
        touch(&dir.path().join("may.xlsx"))?;
        touch(&dir.path().join("june.XLSX"))?;
        touch(&dir.path().join("~$may.xlsx"))?;
        touch(&dir.path().join("april.xlsx"))?;
        touch(&dir.path().join("april-decrypted.xlsx"))?;
        touch(&dir.path().join("notes.txt"))?;

        let found = layout.find_encrypted_inputs()?;
        assert_eq!(
            found,
            vec![dir.path().join("june.XLSX"), dir.path().join("may.xlsx")]
        );
        Ok(())
    }

    #[test]
    fn test_decrypted_pending_excludes_processed_and_archived() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = DataLayout::new(dir.path());
        touch(&dir.path().join("march-decrypted.xlsx"))?;
        touch(&dir.path().join("april-decrypted.xlsx"))?;
        touch(&dir.path().join("may-decrypted.xlsx"))?;
        touch(&dir.path().join("processed/april.json"))?;
        touch(&dir.path().join("archived/march.json"))?;

        let found = layout.find_decrypted_pending()?;
        assert_eq!(found, vec![dir.path().join("may-decrypted.xlsx")]);
        Ok(())
    }

    #[test]
    fn test_processed_pending_lists_json_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let layout = DataLayout::new(dir.path());
        assert!(layout.find_processed_pending()?.is_empty());

        touch(&dir.path().join("processed/may.json"))?;
        touch(&dir.path().join("processed/june.json.tmp"))?;
        assert_eq!(
            layout.find_processed_pending()?,
            vec![dir.path().join("processed/may.json")]
        );
        Ok(())
    }
}
