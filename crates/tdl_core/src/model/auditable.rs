//! Auditable base shared by every tree node.
//!
//! # Responsibility
//! - Carry uid, creation/modification/deletion timestamps and the soft-delete flag.
//! - Keep timestamp ordering intact across every mutation.
//!
//! # Invariants
//! - `uid != 0`.
//! - `ctime <= mtime` and `ctime <= dtime` when `dtime` is present.
//! - `dtime` is present iff `is_deleted`.

use super::error::{DataError, DataResult};
use crate::uid::{Uid, UidError, ABSENT_UID};
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// Microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_epoch_seconds(seconds: i64) -> Self {
        Self(seconds.saturating_mul(1_000_000))
    }

    pub fn now() -> Self {
        Self(Utc::now().timestamp_micros())
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    pub fn as_epoch_seconds(self) -> f64 {
        self.0 as f64 / 1e6
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.0)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_datetime() {
            Some(datetime) => write!(f, "{}", datetime.to_rfc3339()),
            None => write!(f, "{}us", self.0),
        }
    }
}

/// Identity and lifecycle bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audit {
    uid: Uid,
    ctime: Timestamp,
    mtime: Timestamp,
    dtime: Option<Timestamp>,
    is_deleted: bool,
}

impl Audit {
    /// Starts the lifecycle of a new object created at `at`.
    pub fn new(uid: Uid, at: Timestamp) -> DataResult<Self> {
        if uid == ABSENT_UID {
            return Err(DataError::Uid(UidError::Zero));
        }
        Ok(Self {
            uid,
            ctime: at,
            mtime: at,
            dtime: None,
            is_deleted: false,
        })
    }

    /// Rebuilds stored bookkeeping, validating every invariant.
    pub fn restore(
        uid: Uid,
        ctime: Timestamp,
        mtime: Timestamp,
        dtime: Option<Timestamp>,
        is_deleted: bool,
    ) -> DataResult<Self> {
        let audit = Self {
            uid,
            ctime,
            mtime,
            dtime,
            is_deleted,
        };
        audit.validate()?;
        Ok(audit)
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn ctime(&self) -> Timestamp {
        self.ctime
    }

    pub fn mtime(&self) -> Timestamp {
        self.mtime
    }

    pub fn dtime(&self) -> Option<Timestamp> {
        self.dtime
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Records a modification at `at`, never earlier than `ctime`.
    pub fn touch(&mut self, at: Timestamp) {
        self.mtime = at.max(self.ctime);
    }

    /// Sets the soft-delete flag; stamps `dtime` on first deletion and clears it on restore.
    pub fn set_deleted(&mut self, deleted: bool, at: Timestamp) {
        if deleted {
            if self.dtime.is_none() {
                self.dtime = Some(at.max(self.ctime));
            }
        } else {
            self.dtime = None;
        }
        self.is_deleted = deleted;
        self.touch(at);
    }

    pub fn validate(&self) -> DataResult<()> {
        if self.uid == ABSENT_UID {
            return Err(DataError::Uid(UidError::Zero));
        }
        for value in [Some(self.ctime), Some(self.mtime), self.dtime]
            .into_iter()
            .flatten()
        {
            if value.as_micros() < 0 {
                return Err(DataError::NegativeTimestamp(value.as_micros()));
            }
        }
        if self.ctime > self.mtime || self.dtime.is_some_and(|dtime| self.ctime > dtime) {
            return Err(DataError::TimestampOrder { uid: self.uid });
        }
        if self.dtime.is_some() != self.is_deleted {
            return Err(DataError::DeletionTimestampMismatch { uid: self.uid });
        }
        Ok(())
    }
}

/// Common read surface of actions, contexts, projects, folders and context lists.
pub trait Auditable {
    fn audit(&self) -> &Audit;

    fn audit_mut(&mut self) -> &mut Audit;

    fn name(&self) -> &str;

    fn note(&self) -> &str;

    fn uid(&self) -> Uid {
        self.audit().uid()
    }

    fn is_deleted(&self) -> bool {
        self.audit().is_deleted()
    }

    /// Soft-deletes or restores the object.
    fn set_deleted(&mut self, deleted: bool, at: Timestamp) {
        self.audit_mut().set_deleted(deleted, at);
    }
}

#[cfg(test)]
mod tests {
    use super::{Audit, Timestamp};
    use crate::model::error::DataError;

    #[test]
    fn touch_never_moves_mtime_before_ctime() {
        let mut audit = Audit::new(5, Timestamp::from_micros(100)).unwrap();
        audit.touch(Timestamp::from_micros(50));
        assert_eq!(audit.mtime(), Timestamp::from_micros(100));
    }

    #[test]
    fn delete_then_restore_keeps_dtime_in_sync() {
        let mut audit = Audit::new(5, Timestamp::from_micros(100)).unwrap();
        audit.set_deleted(true, Timestamp::from_micros(200));
        assert_eq!(audit.dtime(), Some(Timestamp::from_micros(200)));
        audit.set_deleted(true, Timestamp::from_micros(300));
        assert_eq!(audit.dtime(), Some(Timestamp::from_micros(200)));
        audit.set_deleted(false, Timestamp::from_micros(400));
        assert_eq!(audit.dtime(), None);
        audit.validate().unwrap();
    }

    #[test]
    fn restore_rejects_inverted_timestamps() {
        let err = Audit::restore(
            9,
            Timestamp::from_micros(10),
            Timestamp::from_micros(5),
            None,
            false,
        )
        .unwrap_err();
        assert_eq!(err, DataError::TimestampOrder { uid: 9 });
    }
}
