//! Durable binary format for whole documents.
//!
//! # Responsibility
//! - Encode a well-formed document, optionally zlib-compress it and wrap it
//!   in a SHA-1 checksum envelope.
//! - Prove every freshly written envelope can be read back under the
//!   configured size guard before handing it out.
//! - Decode envelopes, rejecting corruption before any document is built.
//!
//! # Invariants
//! - Encoding never starts from a document that fails well-formedness.
//! - Any failure of the write-side self-test surfaces as
//!   [`SerializationError::TooBigToSave`].
//! - Every read-side failure surfaces as a [`DeserializationError`].

mod envelope;
mod file;
mod wire;

pub use envelope::{sha1_checksum, ChecksumEnvelope};
pub use file::{load_from_path, save_to_path};

use crate::model::document::Document;
use crate::model::error::DataError;
use crate::uid::{UidAllocator, UidSource};
use log::{debug, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use wire::WireDocument;

/// Default zlib level; favors CPU over bytes on the wire.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 2;
/// Default decode guard: 64 MiB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// Knobs of the write and read paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializationConfig {
    /// `0` stores the payload uncompressed; `1..=9` is the zlib level.
    pub compression_level: u32,
    /// Upper bound on decoded envelope and payload sizes.
    pub max_payload_bytes: u64,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

#[derive(Debug)]
pub enum SerializationError {
    /// The document failed well-formedness before encoding.
    Data(DataError),
    /// Encoding the document or envelope failed.
    Encode(bincode::Error),
    /// zlib compression failed.
    Compress(std::io::Error),
    /// The written bytes could not be read back under the size guard.
    TooBigToSave(String),
    /// Writing the save file failed.
    Io(std::io::Error),
}

impl Display for SerializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data(err) => write!(f, "refusing to save a malformed document: {err}"),
            Self::Encode(err) => write!(f, "encoding failed: {err}"),
            Self::Compress(err) => write!(f, "compression failed: {err}"),
            Self::TooBigToSave(reason) => write!(
                f,
                "to-do list is too big to save ({reason}); delete completed items and purge deleted ones"
            ),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SerializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Data(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Compress(err) | Self::Io(err) => Some(err),
            Self::TooBigToSave(_) => None,
        }
    }
}

impl From<DataError> for SerializationError {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}

#[derive(Debug)]
pub enum DeserializationError {
    /// The envelope itself could not be decoded.
    Envelope(bincode::Error),
    /// Declared payload length is zero or disagrees with the actual payload.
    LengthMismatch { declared: u64, actual: usize },
    /// SHA-1 of the stored payload differs from the recorded checksum.
    ChecksumMismatch { recorded: String, computed: String },
    /// The payload is flagged compressed but does not inflate.
    Decompress(std::io::Error),
    /// The payload does not decode into a document.
    Decode(bincode::Error),
    /// A required top-level field is absent.
    MissingField(&'static str),
    /// The decoded document breaks an invariant.
    Data(DataError),
    /// Reading the save file failed.
    Io(std::io::Error),
}

impl Display for DeserializationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Envelope(err) => write!(f, "data corruption: cannot decode envelope: {err}"),
            Self::LengthMismatch { declared, actual } => write!(
                f,
                "invalid save data: payload_length={declared} but len(payload)={actual}"
            ),
            Self::ChecksumMismatch { .. } => write!(f, "invalid save data: checksum mismatch"),
            Self::Decompress(err) => write!(f, "invalid save data: cannot decompress: {err}"),
            Self::Decode(err) => write!(f, "invalid save data: cannot decode document: {err}"),
            Self::MissingField(field) => write!(f, "invalid save data: `{field}` is missing"),
            Self::Data(err) => write!(f, "invalid save data: {err}"),
            Self::Io(err) => write!(f, "cannot read save file: {err}"),
        }
    }
}

impl Error for DeserializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Envelope(err) | Self::Decode(err) => Some(err),
            Self::Decompress(err) | Self::Io(err) => Some(err),
            Self::Data(err) => Some(err),
            Self::LengthMismatch { .. } | Self::ChecksumMismatch { .. } | Self::MissingField(_) => {
                None
            }
        }
    }
}

impl From<DataError> for DeserializationError {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}

impl From<crate::uid::UidError> for DeserializationError {
    fn from(value: crate::uid::UidError) -> Self {
        Self::Data(DataError::Uid(value))
    }
}

/// Encodes `doc` into checksum-envelope bytes.
///
/// # Errors
/// - [`SerializationError::Data`] when `doc` is not well formed.
/// - [`SerializationError::TooBigToSave`] when the result cannot be read back
///   under `config.max_payload_bytes`.
pub fn serialize_document(
    doc: &Document,
    config: &SerializationConfig,
) -> Result<Vec<u8>, SerializationError> {
    doc.check_is_well_formed()?;
    let payload = envelope::encode(&WireDocument::from_document(doc))
        .map_err(SerializationError::Encode)?;
    let uncompressed_len = payload.len();
    let sealed = ChecksumEnvelope::seal(payload, config.compression_level)?;
    let checksum = sealed.sha1_checksum.clone();
    let bytes = envelope::encode(&sealed).map_err(SerializationError::Encode)?;

    if let Err(err) = self_test(&bytes, &checksum, config) {
        warn!(
            "event=serialize module=codec status=error error_code=self_test_failed bytes={}",
            bytes.len()
        );
        return Err(SerializationError::TooBigToSave(err.to_string()));
    }

    debug!(
        "event=serialize module=codec status=ok payload_bytes={} envelope_bytes={} compression_level={}",
        uncompressed_len,
        bytes.len(),
        config.compression_level
    );
    Ok(bytes)
}

fn self_test(
    bytes: &[u8],
    checksum: &str,
    config: &SerializationConfig,
) -> Result<(), DeserializationError> {
    let scratch = UidAllocator::sequential();
    let (_, _) = deserialize_with_checksum(bytes, &scratch, config)?;
    let reread = envelope::decode::<ChecksumEnvelope>(bytes, config.max_payload_bytes)
        .map_err(DeserializationError::Envelope)?;
    if reread.sha1_checksum != checksum {
        return Err(DeserializationError::ChecksumMismatch {
            recorded: reread.sha1_checksum,
            computed: checksum.to_string(),
        });
    }
    Ok(())
}

/// Decodes checksum-envelope bytes into a document, registering every uid with `ids`.
pub fn deserialize_document(
    bytes: &[u8],
    ids: &dyn UidSource,
    config: &SerializationConfig,
) -> Result<Document, DeserializationError> {
    deserialize_with_checksum(bytes, ids, config).map(|(doc, _)| doc)
}

/// Like [`deserialize_document`], also returning the SHA-1 hex digest of the
/// uncompressed payload.
pub fn deserialize_with_checksum(
    bytes: &[u8],
    ids: &dyn UidSource,
    config: &SerializationConfig,
) -> Result<(Document, String), DeserializationError> {
    let envelope = envelope::decode::<ChecksumEnvelope>(bytes, config.max_payload_bytes)
        .map_err(DeserializationError::Envelope)?;
    let payload = envelope.open(config.max_payload_bytes)?;
    let checksum = if envelope.payload_is_zlib_compressed {
        sha1_checksum(&payload)
    } else {
        envelope.sha1_checksum.clone()
    };
    let wire = envelope::decode::<WireDocument>(&payload, config.max_payload_bytes)
        .map_err(DeserializationError::Decode)?;
    let doc = wire.into_document(ids)?;
    doc.check_is_well_formed()?;
    debug!(
        "event=deserialize module=codec status=ok envelope_bytes={} payload_bytes={}",
        bytes.len(),
        payload.len()
    );
    Ok((doc, checksum))
}
