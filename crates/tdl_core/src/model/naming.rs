//! Reserved `uid=N` naming syntax.
//!
//! # Responsibility
//! - Parse `uid=N` references used by path resolution.
//! - Reject user-chosen names that would be mistaken for such references.
//!
//! # Invariants
//! - The prefix match is case-insensitive, matching how references parse.

use super::error::DataError;
use crate::uid::{Uid, ABSENT_UID};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static RESERVED_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^uid=").expect("valid reserved prefix regex"));

/// Malformed `uid=N` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidSyntaxError(pub String);

impl Display for UidSyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "illegal uid syntax `{}`; expected uid=N where N is a nonzero signed 64-bit decimal integer",
            self.0
        )
    }
}

impl Error for UidSyntaxError {}

/// Returns `Ok(None)` unless `candidate` is a `uid=N` reference.
pub fn parse_uid_syntax(candidate: &str) -> Result<Option<Uid>, UidSyntaxError> {
    if !RESERVED_PREFIX_RE.is_match(candidate) || candidate.matches('=').count() != 1 {
        return Ok(None);
    }
    let (_, digits) = candidate
        .split_once('=')
        .ok_or_else(|| UidSyntaxError(candidate.to_string()))?;
    match digits.parse::<Uid>() {
        Ok(value) if value != ABSENT_UID => Ok(Some(value)),
        _ => Err(UidSyntaxError(candidate.to_string())),
    }
}

/// Formats a uid in reference syntax.
pub fn uid_reference(uid: Uid) -> String {
    format!("uid={uid}")
}

/// Rejects names that collide with the reserved reference syntax.
pub fn validate_name(name: &str) -> Result<(), DataError> {
    if RESERVED_PREFIX_RE.is_match(name) {
        return Err(DataError::ReservedName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_uid_syntax, uid_reference, validate_name};

    #[test]
    fn parses_signed_references() {
        assert_eq!(parse_uid_syntax("uid=42").unwrap(), Some(42));
        assert_eq!(parse_uid_syntax("UID=-7").unwrap(), Some(-7));
        assert_eq!(parse_uid_syntax(&uid_reference(i64::MIN)).unwrap(), Some(i64::MIN));
    }

    #[test]
    fn plain_names_are_not_references() {
        assert_eq!(parse_uid_syntax("groceries").unwrap(), None);
        assert_eq!(parse_uid_syntax("uid=1=2").unwrap(), None);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(parse_uid_syntax("uid=0").is_err());
        assert!(parse_uid_syntax("uid=abc").is_err());
        assert!(parse_uid_syntax("uid=9223372036854775808").is_err());
    }

    #[test]
    fn reserved_prefix_is_rejected_as_a_name() {
        assert!(validate_name("uid=3").is_err());
        assert!(validate_name("Uid=x").is_err());
        assert!(validate_name("fluid=3").is_ok());
    }
}
