//! Unique identifier allocation for auditable objects.
//!
//! # Responsibility
//! - Issue signed 64-bit identifiers that never repeat within one allocator.
//! - Register identifiers read back from persisted documents.
//! - Replay previously issued identifiers during undo/redo.
//!
//! # Invariants
//! - `0` is never issued or registered.
//! - Random mode never issues [`INBOX_UID`] or [`ROOT_FOLDER_UID`].
//! - Every issued or registered uid is remembered until [`UidAllocator::reset`].

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Identifier shared by every auditable object in a document.
pub type Uid = i64;

/// The inbox project always carries this uid.
pub const INBOX_UID: Uid = 1;
/// The root folder always carries this uid.
pub const ROOT_FOLDER_UID: Uid = 2;
/// Wire value standing for "no uid".
pub const ABSENT_UID: Uid = 0;

pub type UidResult<T> = Result<T, UidError>;

/// Allocation and registration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidError {
    /// A uid is missing or explicitly zero.
    Zero,
    /// The uid was already issued or registered.
    Duplicate(Uid),
    /// Sequential mode reached `2^63`.
    Exhausted,
    /// Replay asked for more uids than the forward execution issued.
    ReplayExhausted,
}

impl Display for UidError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zero => write!(f, "uid is missing or explicitly zero"),
            Self::Duplicate(uid) => write!(f, "uid {uid} is duplicated"),
            Self::Exhausted => write!(f, "ran out of uids at value 2**63"),
            Self::ReplayExhausted => {
                write!(f, "replayed command requested more uids than were recorded")
            }
        }
    }
}

impl Error for UidError {}

/// Generation strategy for [`UidAllocator::next_uid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UidMode {
    /// Uniform draw over the whole signed 64-bit range.
    #[default]
    Random,
    /// `max(seen) + 1`, starting at 1. Meant for tests and reproducible exports.
    Sequential,
}

/// Anything entity construction can draw identifiers from.
pub trait UidSource {
    /// Returns a uid never seen before by this source.
    fn next_uid(&self) -> UidResult<Uid>;
    /// Registers a uid supplied from outside, e.g. by deserialization.
    fn note_existing_uid(&self, uid: Uid) -> UidResult<()>;
}

/// Thread-safe uid factory.
///
/// One allocator backs one loaded document. Rewinding the document for
/// undo/redo calls [`UidAllocator::reset`] before re-registering the snapshot.
#[derive(Debug)]
pub struct UidAllocator {
    mode: UidMode,
    seen: Mutex<HashSet<Uid>>,
}

impl UidAllocator {
    pub fn new(mode: UidMode) -> Self {
        Self {
            mode,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn random() -> Self {
        Self::new(UidMode::Random)
    }

    pub fn sequential() -> Self {
        Self::new(UidMode::Sequential)
    }

    pub fn mode(&self) -> UidMode {
        self.mode
    }

    /// Forgets every issued and registered uid.
    pub fn reset(&self) {
        self.seen().clear();
    }

    /// Number of uids currently remembered.
    pub fn len(&self) -> usize {
        self.seen().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen().is_empty()
    }

    pub fn is_registered(&self, uid: Uid) -> bool {
        self.seen().contains(&uid)
    }

    fn seen(&self) -> MutexGuard<'_, HashSet<Uid>> {
        // The set stays consistent even if a holder panicked mid-insert.
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for UidAllocator {
    fn default() -> Self {
        Self::random()
    }
}

/// Copies the remembered set; the two allocators evolve independently afterwards.
impl Clone for UidAllocator {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            seen: Mutex::new(self.seen().clone()),
        }
    }
}

impl UidSource for UidAllocator {
    fn next_uid(&self) -> UidResult<Uid> {
        let mut seen = self.seen();
        match self.mode {
            UidMode::Random => {
                let mut rng = rand::rng();
                loop {
                    let candidate: Uid = rng.random();
                    if is_reserved(candidate) || seen.contains(&candidate) {
                        debug!("event=uid_collision module=uid status=retry");
                        continue;
                    }
                    seen.insert(candidate);
                    return Ok(candidate);
                }
            }
            UidMode::Sequential => {
                let next = match seen.iter().max() {
                    Some(max) => max.checked_add(1).ok_or(UidError::Exhausted)?.max(INBOX_UID),
                    None => INBOX_UID,
                };
                seen.insert(next);
                Ok(next)
            }
        }
    }

    fn note_existing_uid(&self, uid: Uid) -> UidResult<()> {
        if uid == ABSENT_UID {
            return Err(UidError::Zero);
        }
        if !self.seen().insert(uid) {
            return Err(UidError::Duplicate(uid));
        }
        Ok(())
    }
}

fn is_reserved(uid: Uid) -> bool {
    matches!(uid, ABSENT_UID | INBOX_UID | ROOT_FOLDER_UID)
}

/// Per-command view of an allocator.
///
/// A fresh lease draws new uids and remembers them so the command can be
/// journaled; a replay lease hands back exactly the recorded uids, in order.
pub struct UidLease<'a> {
    allocator: &'a UidAllocator,
    recorded: Option<RefCell<VecDeque<Uid>>>,
    issued: RefCell<Vec<Uid>>,
}

impl<'a> UidLease<'a> {
    pub fn fresh(allocator: &'a UidAllocator) -> Self {
        Self {
            allocator,
            recorded: None,
            issued: RefCell::new(Vec::new()),
        }
    }

    pub fn replay(allocator: &'a UidAllocator, recorded: &[Uid]) -> Self {
        Self {
            allocator,
            recorded: Some(RefCell::new(recorded.iter().copied().collect())),
            issued: RefCell::new(Vec::new()),
        }
    }

    pub fn is_replay(&self) -> bool {
        self.recorded.is_some()
    }

    /// Returns every uid this lease handed out, in issue order.
    pub fn into_issued(self) -> Vec<Uid> {
        if let Some(recorded) = &self.recorded {
            let leftover = recorded.borrow().len();
            if leftover > 0 {
                warn!(
                    "event=uid_replay module=uid status=error error_code=unused_recorded_uids count={leftover}"
                );
            }
        }
        self.issued.into_inner()
    }
}

impl UidSource for UidLease<'_> {
    fn next_uid(&self) -> UidResult<Uid> {
        let uid = match &self.recorded {
            Some(recorded) => {
                let uid = recorded
                    .borrow_mut()
                    .pop_front()
                    .ok_or(UidError::ReplayExhausted)?;
                self.allocator.note_existing_uid(uid)?;
                uid
            }
            None => self.allocator.next_uid()?,
        };
        self.issued.borrow_mut().push(uid);
        Ok(uid)
    }

    fn note_existing_uid(&self, uid: Uid) -> UidResult<()> {
        self.allocator.note_existing_uid(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::{is_reserved, UidAllocator, UidLease, UidSource, ROOT_FOLDER_UID};

    #[test]
    fn reserved_values_cover_zero_inbox_and_root() {
        assert!(is_reserved(0));
        assert!(is_reserved(1));
        assert!(is_reserved(ROOT_FOLDER_UID));
        assert!(!is_reserved(-1));
    }

    #[test]
    fn sequential_mode_skips_past_negative_registrations() {
        let allocator = UidAllocator::sequential();
        allocator.note_existing_uid(-1).unwrap();
        assert_eq!(allocator.next_uid().unwrap(), 1);
    }

    #[test]
    fn clones_do_not_share_registrations() {
        let allocator = UidAllocator::sequential();
        allocator.note_existing_uid(5).unwrap();
        let copy = allocator.clone();
        assert_eq!(copy.next_uid().unwrap(), 6);
        assert!(copy.is_registered(5));
        assert!(!allocator.is_registered(6));
    }

    #[test]
    fn fresh_lease_records_issued_uids() {
        let allocator = UidAllocator::sequential();
        let lease = UidLease::fresh(&allocator);
        let first = lease.next_uid().unwrap();
        let second = lease.next_uid().unwrap();
        assert_eq!(lease.into_issued(), vec![first, second]);
    }
}
