//! Decryption stage - Produces a plaintext working copy of a POS export.
//!
//! Exports are usually password protected (an OLE container wrapping the encrypted
//! workbook), but some are already plain `.xlsx`. A failed decryption falls back to a
//! byte-identical copy so one odd file never stops a run. Decrypted output must be a ZIP
//! container; anything else means the passphrase was wrong, and the still-encrypted copy
//! is left for the extractor to reject.

use crate::errors::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Leading bytes of a ZIP container, i.e. a plaintext `.xlsx`.
pub const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
/// Leading bytes of an OLE compound document (encrypted OOXML or legacy `.xls`).
pub const OLE_SIGNATURE: &[u8] = b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1";

/// What the stage did for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptOutcome {
    /// The working copy already existed; nothing was done
    AlreadyPresent(PathBuf),
    /// The input was decrypted with the passphrase
    Decrypted(PathBuf),
    /// The input was copied as is
    Copied(PathBuf),
}

impl DecryptOutcome {
    /// Path of the plaintext working copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyPresent(path) | Self::Decrypted(path) | Self::Copied(path) => path,
        }
    }
}

/// Kind of container, judged from the first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Plain OOXML workbook
    Zip,
    /// OLE compound document
    Ole,
    /// Anything else
    Unknown,
}

/// Classifies file content by its signature.
#[must_use]
pub fn sniff_container(bytes: &[u8]) -> ContainerKind {
    if bytes.starts_with(ZIP_SIGNATURE) {
        ContainerKind::Zip
    } else if bytes.starts_with(OLE_SIGNATURE) {
        ContainerKind::Ole
    } else {
        ContainerKind::Unknown
    }
}

/// Decrypts OOXML bytes with `password`.
///
/// # Errors
/// Returns [`Error::Decryption`] when the content is not an encrypted workbook or the
/// passphrase does not match.
pub fn decrypt_bytes(source: &Path, bytes: Vec<u8>, password: &str) -> Result<Vec<u8>> {
    let plaintext =
        office_crypto::decrypt_from_bytes(bytes, password).map_err(|e| Error::Decryption {
            path: source.to_path_buf(),
            message: format!("{e:?}"),
        })?;
    // The key is never verified upstream; a wrong one yields noise.
    if !plaintext.starts_with(ZIP_SIGNATURE) {
        return Err(Error::Decryption {
            path: source.to_path_buf(),
            message: "passphrase did not yield a workbook".to_string(),
        });
    }
    Ok(plaintext)
}

/// Writes the plaintext working copy of `input` to `output`.
///
/// Skips when `output` already exists. The copy is written under a `.tmp` name and
/// renamed into place so an interrupted run never leaves a half-written workbook.
///
/// # Errors
/// Returns an error only for file system failures; decryption failures fall back to a copy.
pub fn decrypt_workbook(input: &Path, output: &Path, password: &str) -> Result<DecryptOutcome> {
    if output.exists() {
        info!("{} already decrypted, skipping", input.display());
        return Ok(DecryptOutcome::AlreadyPresent(output.to_path_buf()));
    }

    let bytes = fs::read(input)?;
    let kind = sniff_container(&bytes);
    let (plaintext, decrypted) = match kind {
        ContainerKind::Zip => {
            info!("{} is not encrypted, copying", input.display());
            (bytes, false)
        }
        ContainerKind::Ole => match decrypt_bytes(input, bytes.clone(), password) {
            Ok(plaintext) => (plaintext, true),
            Err(e) => {
                warn!("{}; treating it as unencrypted and copying", e);
                warn!(
                    "{} still looks like a protected container; check EXCEL_PASSWORD",
                    input.display()
                );
                (bytes, false)
            }
        },
        ContainerKind::Unknown => {
            warn!(
                "{} is not a recognizable workbook container, copying as is",
                input.display()
            );
            (bytes, false)
        }
    };

    let partial = partial_path(output);
    fs::write(&partial, &plaintext)?;
    fs::rename(&partial, output)?;

    if decrypted {
        info!("Decrypted {} -> {}", input.display(), output.display());
        Ok(DecryptOutcome::Decrypted(output.to_path_buf()))
    } else {
        Ok(DecryptOutcome::Copied(output.to_path_buf()))
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    output.with_file_name(name)
}
