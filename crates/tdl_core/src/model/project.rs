//! Project container of actions.
//!
//! # Responsibility
//! - Hold ordered actions plus completion, activity and review state.
//!
//! # Invariants
//! - `max_seconds_before_review` is finite and non-negative.
//! - `last_review_epoch_sec == 0` means "never reviewed".

use super::action::Action;
use super::auditable::{Audit, Auditable, Timestamp};
use super::error::{DataError, DataResult};
use super::naming::validate_name;
use crate::uid::{Uid, UidSource};

/// One week.
pub const DEFAULT_MAX_SECONDS_BEFORE_REVIEW: f64 = 7.0 * 24.0 * 3600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    audit: Audit,
    name: String,
    note: String,
    is_complete: bool,
    is_active: bool,
    default_context_uid: Option<Uid>,
    max_seconds_before_review: f64,
    last_review_epoch_sec: f64,
    pub(crate) items: Vec<Action>,
}

/// Stored project fields other than bookkeeping and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectState {
    pub name: String,
    pub note: String,
    pub is_complete: bool,
    pub is_active: bool,
    pub default_context_uid: Option<Uid>,
    pub max_seconds_before_review: f64,
    pub last_review_epoch_sec: f64,
}

impl Project {
    pub fn new(ids: &dyn UidSource, name: impl Into<String>, at: Timestamp) -> DataResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let uid = ids.next_uid()?;
        Self::with_uid(uid, name, at)
    }

    /// Builds a project with a predetermined uid (the inbox).
    pub(crate) fn with_uid(uid: Uid, name: String, at: Timestamp) -> DataResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            audit: Audit::new(uid, at)?,
            name,
            note: String::new(),
            is_complete: false,
            is_active: true,
            default_context_uid: None,
            max_seconds_before_review: DEFAULT_MAX_SECONDS_BEFORE_REVIEW,
            last_review_epoch_sec: 0.0,
            items: Vec::new(),
        })
    }

    pub fn restore(audit: Audit, state: ProjectState, items: Vec<Action>) -> DataResult<Self> {
        validate_name(&state.name)?;
        validate_review_interval(state.max_seconds_before_review)?;
        Ok(Self {
            audit,
            name: state.name,
            note: state.note,
            is_complete: state.is_complete,
            is_active: state.is_active,
            default_context_uid: state.default_context_uid,
            max_seconds_before_review: state.max_seconds_before_review,
            last_review_epoch_sec: state.last_review_epoch_sec,
            items,
        })
    }

    pub fn items(&self) -> &[Action] {
        &self.items
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_done(&self) -> bool {
        self.is_complete || self.is_deleted()
    }

    pub fn default_context_uid(&self) -> Option<Uid> {
        self.default_context_uid
    }

    pub fn max_seconds_before_review(&self) -> f64 {
        self.max_seconds_before_review
    }

    /// Seconds since the epoch, or `0.0` if never reviewed.
    pub fn last_review_epoch_sec(&self) -> f64 {
        self.last_review_epoch_sec
    }

    pub fn needs_review(&self, now: Timestamp) -> bool {
        self.last_review_epoch_sec < now.as_epoch_seconds() - self.max_seconds_before_review
    }

    pub fn mark_reviewed(&mut self, at: Timestamp) {
        self.last_review_epoch_sec = at.as_epoch_seconds();
        self.audit.touch(at);
    }

    pub fn clear_review(&mut self, at: Timestamp) {
        self.last_review_epoch_sec = 0.0;
        self.audit.touch(at);
    }

    pub fn set_max_seconds_before_review(&mut self, seconds: f64, at: Timestamp) -> DataResult<()> {
        validate_review_interval(seconds)?;
        self.max_seconds_before_review = seconds;
        self.audit.touch(at);
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>, at: Timestamp) -> DataResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.audit.touch(at);
        Ok(())
    }

    pub fn set_note(&mut self, note: impl Into<String>, at: Timestamp) {
        self.note = note.into();
        self.audit.touch(at);
    }

    pub fn set_complete(&mut self, complete: bool, at: Timestamp) {
        self.is_complete = complete;
        self.audit.touch(at);
    }

    pub fn set_active(&mut self, active: bool, at: Timestamp) {
        self.is_active = active;
        self.audit.touch(at);
    }

    pub fn set_default_context(&mut self, context_uid: Option<Uid>, at: Timestamp) {
        self.default_context_uid = context_uid;
        self.audit.touch(at);
    }

    pub fn action(&self, uid: Uid) -> Option<&Action> {
        self.items.iter().find(|action| action.uid() == uid)
    }

    pub(crate) fn action_mut(&mut self, uid: Uid) -> Option<&mut Action> {
        self.items.iter_mut().find(|action| action.uid() == uid)
    }

    pub(crate) fn push_action(&mut self, action: Action, at: Timestamp) {
        self.items.push(action);
        self.audit.touch(at);
    }

    pub(crate) fn take_action(&mut self, uid: Uid, at: Timestamp) -> Option<Action> {
        let index = self.items.iter().position(|action| action.uid() == uid)?;
        self.audit.touch(at);
        Some(self.items.remove(index))
    }
}

impl Auditable for Project {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn note(&self) -> &str {
        &self.note
    }
}

fn validate_review_interval(seconds: f64) -> DataResult<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(DataError::InvalidReviewInterval(seconds));
    }
    Ok(())
}
