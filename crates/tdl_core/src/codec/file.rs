//! Save-file persistence with temp-file write and one backup generation.
//!
//! # Invariants
//! - The new contents are fully written to `<path>.tmp` before the old file moves.
//! - The previous save survives as `<path>.bak`.

use super::{deserialize_document, serialize_document, DeserializationError, SerializationConfig, SerializationError};
use crate::model::auditable::Timestamp;
use crate::model::document::Document;
use crate::uid::UidSource;
use log::{info, warn};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Serializes `doc` and atomically replaces the file at `path`.
pub fn save_to_path(
    doc: &Document,
    path: impl AsRef<Path>,
    config: &SerializationConfig,
) -> Result<(), SerializationError> {
    let started_at = Instant::now();
    let path = path.as_ref();
    let bytes = serialize_document(doc, config)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(SerializationError::Io)?;
    }
    let tmp_path = with_suffix(path, ".tmp");
    let bak_path = with_suffix(path, ".bak");
    fs::write(&tmp_path, &bytes).map_err(SerializationError::Io)?;
    remove_if_present(&bak_path).map_err(SerializationError::Io)?;
    if let Err(err) = fs::rename(path, &bak_path) {
        if err.kind() != ErrorKind::NotFound {
            warn!(
                "event=save_file module=codec status=error error_code=backup_failed error={}",
                err
            );
            return Err(SerializationError::Io(err));
        }
    }
    fs::rename(&tmp_path, path).map_err(SerializationError::Io)?;

    info!(
        "event=save_file module=codec status=ok bytes={} duration_ms={}",
        bytes.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Loads the document at `path`; a missing or empty file yields a fresh document.
pub fn load_from_path(
    path: impl AsRef<Path>,
    ids: &dyn UidSource,
    config: &SerializationConfig,
    inbox_name: &str,
) -> Result<Document, DeserializationError> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
        Err(err) => return Err(DeserializationError::Io(err)),
    };
    if bytes.is_empty() {
        info!("event=load_file module=codec status=ok mode=fresh");
        return Ok(Document::new(ids, inbox_name, Timestamp::now())?);
    }
    let doc = deserialize_document(&bytes, ids, config)?;
    info!("event=load_file module=codec status=ok mode=existing bytes={}", bytes.len());
    Ok(doc)
}
