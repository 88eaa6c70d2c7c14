//! Checksum envelope and the bincode settings shared by every encoded value.

use super::{DeserializationError, SerializationError};
use bincode::Options;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha1::Digest as _;
use std::fmt::Write as _;
use std::io::{Read, Write};

/// Outer record of every save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumEnvelope {
    pub payload: Vec<u8>,
    pub payload_length: u64,
    pub payload_is_zlib_compressed: bool,
    /// Lowercase hex SHA-1 of `payload` as stored.
    pub sha1_checksum: String,
}

impl ChecksumEnvelope {
    /// Wraps an encoded document, compressing it when `compression_level > 0`.
    pub fn seal(payload: Vec<u8>, compression_level: u32) -> Result<Self, SerializationError> {
        let (payload, compressed) = if compression_level == 0 {
            (payload, false)
        } else {
            let mut encoder =
                ZlibEncoder::new(Vec::new(), Compression::new(compression_level.min(9)));
            encoder
                .write_all(&payload)
                .map_err(SerializationError::Compress)?;
            (encoder.finish().map_err(SerializationError::Compress)?, true)
        };
        Ok(Self {
            payload_length: payload.len() as u64,
            sha1_checksum: sha1_checksum(&payload),
            payload,
            payload_is_zlib_compressed: compressed,
        })
    }

    /// Verifies length and checksum, then returns the uncompressed payload.
    pub fn open(&self, max_bytes: u64) -> Result<Vec<u8>, DeserializationError> {
        if self.payload_length < 1 || self.payload_length != self.payload.len() as u64 {
            return Err(DeserializationError::LengthMismatch {
                declared: self.payload_length,
                actual: self.payload.len(),
            });
        }
        let computed = sha1_checksum(&self.payload);
        if computed != self.sha1_checksum {
            return Err(DeserializationError::ChecksumMismatch {
                recorded: self.sha1_checksum.clone(),
                computed,
            });
        }
        if !self.payload_is_zlib_compressed {
            return Ok(self.payload.clone());
        }
        inflate(&self.payload, max_bytes)
    }
}

fn inflate(compressed: &[u8], max_bytes: u64) -> Result<Vec<u8>, DeserializationError> {
    let mut inflated = Vec::new();
    ZlibDecoder::new(compressed)
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut inflated)
        .map_err(DeserializationError::Decompress)?;
    if inflated.len() as u64 > max_bytes {
        return Err(DeserializationError::Decompress(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("inflated payload exceeds {max_bytes} bytes"),
        )));
    }
    Ok(inflated)
}

/// Lowercase hex SHA-1 digest of `bytes`.
pub fn sha1_checksum(bytes: &[u8]) -> String {
    let mut hasher = sha1::Sha1::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(40);
    for byte in digest {
        // Writing into a String cannot fail.
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Fixed-width little-endian integers; trailing bytes are an error.
fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

pub(crate) fn encode<T: Serialize>(value: &T) -> bincode::Result<Vec<u8>> {
    options().serialize(value)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8], max_bytes: u64) -> bincode::Result<T> {
    options().with_limit(max_bytes).deserialize(bytes)
}

#[cfg(test)]
mod tests {
    use super::{sha1_checksum, ChecksumEnvelope};
    use crate::codec::DeserializationError;

    #[test]
    fn sha1_matches_known_vector() {
        assert_eq!(sha1_checksum(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn compressed_envelope_opens_to_the_original_bytes() {
        let envelope = ChecksumEnvelope::seal(b"hello hello hello".to_vec(), 9).unwrap();
        assert!(envelope.payload_is_zlib_compressed);
        assert_eq!(envelope.open(1024).unwrap(), b"hello hello hello");
    }

    #[test]
    fn inflation_is_bounded() {
        let envelope = ChecksumEnvelope::seal(vec![0u8; 4096], 6).unwrap();
        assert!(matches!(
            envelope.open(100),
            Err(DeserializationError::Decompress(_))
        ));
    }

    #[test]
    fn zero_length_payload_is_rejected() {
        let envelope = ChecksumEnvelope::seal(Vec::new(), 0).unwrap();
        assert!(matches!(
            envelope.open(100),
            Err(DeserializationError::LengthMismatch { declared: 0, actual: 0 })
        ));
    }
}
