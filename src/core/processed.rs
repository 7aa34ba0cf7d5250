//! Processed-file format: one JSON array of canonical records per source workbook.

use crate::{errors::Result, models::CanonicalRecord};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `records` to `path` as pretty-printed JSON, creating parent directories.
///
/// The file is written under a `.tmp` name and renamed into place so a crash never
/// leaves a truncated file that looks finished.
pub fn write_records(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let partial = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(fs::File::create(&partial)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
    }
    fs::rename(&partial, path)?;
    Ok(())
}

/// Reads a processed file back.
pub fn read_records(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, dated_record};

    #[test]
    fn test_processed_file_preserves_timestamps() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("processed").join("sales.json");
        let mut record = dated_record("A100", "Cola", at(2024, 5, 1, 13));
        record.extra.insert("비고".to_string(), "포장".to_string());

        write_records(&path, std::slice::from_ref(&record))?;
        let loaded = read_records(&path)?;

        assert_eq!(loaded, vec![record]);
        assert!(!path.with_extension("json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_reading_malformed_file_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json")?;
        assert!(read_records(&path).is_err());
        Ok(())
    }
}
