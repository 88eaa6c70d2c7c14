//! Two-way merge entry point.
//!
//! # Invariants
//! - `db` is the stored document; `remote` is the serialized copy another
//!   device sent back. The order matters because remote writers may drop
//!   fields they do not know.
//! - Merging itself is not implemented; valid input always yields
//!   [`MergeError::NotImplemented`].

use crate::model::document::Document;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// One of the two inputs is absent.
    MissingInput(&'static str),
    NotImplemented,
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingInput(which) => write!(f, "merge input `{which}` must be present"),
            Self::NotImplemented => write!(f, "merging documents is not implemented"),
        }
    }
}

impl Error for MergeError {}

/// Merges `remote` envelope bytes into `db`, returning the merged envelope.
pub fn merge(db: Option<&Document>, remote: Option<&[u8]>) -> Result<Vec<u8>, MergeError> {
    if db.is_none() {
        return Err(MergeError::MissingInput("db"));
    }
    match remote {
        Some(bytes) if !bytes.is_empty() => {}
        _ => return Err(MergeError::MissingInput("remote")),
    }
    warn!("event=merge module=sync status=error error_code=not_implemented");
    Err(MergeError::NotImplemented)
}

#[cfg(test)]
mod tests {
    use super::{merge, MergeError};
    use crate::model::auditable::Timestamp;
    use crate::model::document::Document;
    use crate::uid::UidAllocator;

    #[test]
    fn inputs_are_checked_before_refusing() {
        let ids = UidAllocator::sequential();
        let doc = Document::new(&ids, "inbox", Timestamp::EPOCH).unwrap();

        assert_eq!(merge(None, Some(b"x")), Err(MergeError::MissingInput("db")));
        assert_eq!(merge(Some(&doc), None), Err(MergeError::MissingInput("remote")));
        assert_eq!(merge(Some(&doc), Some(b"x")), Err(MergeError::NotImplemented));
    }
}
