//! Action leaf node.
//!
//! # Invariants
//! - Actions live only inside projects.
//! - `context_uid` is a weak reference; the document keeps it resolvable.

use super::auditable::{Audit, Auditable, Timestamp};
use super::error::DataResult;
use super::naming::validate_name;
use crate::uid::{Uid, UidSource};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    audit: Audit,
    name: String,
    note: String,
    is_complete: bool,
    context_uid: Option<Uid>,
}

impl Action {
    /// Creates an incomplete action with a freshly allocated uid.
    pub fn new(
        ids: &dyn UidSource,
        name: impl Into<String>,
        context_uid: Option<Uid>,
        at: Timestamp,
    ) -> DataResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let audit = Audit::new(ids.next_uid()?, at)?;
        Ok(Self {
            audit,
            name,
            note: String::new(),
            is_complete: false,
            context_uid,
        })
    }

    /// Rebuilds a stored action. Uid registration is the caller's job.
    pub fn restore(
        audit: Audit,
        name: String,
        note: String,
        is_complete: bool,
        context_uid: Option<Uid>,
    ) -> DataResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            audit,
            name,
            note,
            is_complete,
            context_uid,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Complete or deleted.
    pub fn is_done(&self) -> bool {
        self.is_complete || self.is_deleted()
    }

    pub fn context_uid(&self) -> Option<Uid> {
        self.context_uid
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

    pub fn set_context(&mut self, context_uid: Option<Uid>, at: Timestamp) {
        self.context_uid = context_uid;
        self.audit.touch(at);
    }

    /// Soft-deletes and scrubs metadata, keeping only the uid.
    ///
    /// Other replicas still recognize the uid; [`super::container::Container::purge_deleted`]
    /// removes it for real.
    pub fn almost_purge(&mut self, at: Timestamp) {
        self.name.clear();
        self.note.clear();
        self.context_uid = None;
        self.audit.set_deleted(true, at);
    }
}

impl Auditable for Action {
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

#[cfg(test)]
mod tests {
    use super::Action;
    use crate::model::auditable::{Auditable, Timestamp};
    use crate::uid::UidAllocator;

    #[test]
    fn almost_purge_keeps_only_the_uid() {
        let ids = UidAllocator::sequential();
        let mut action = Action::new(&ids, "call mom", Some(7), Timestamp::from_micros(1)).unwrap();
        action.set_note("about the trip", Timestamp::from_micros(2));
        let uid = action.uid();

        action.almost_purge(Timestamp::from_micros(3));

        assert_eq!(action.uid(), uid);
        assert_eq!(action.name(), "");
        assert_eq!(action.note(), "");
        assert_eq!(action.context_uid(), None);
        assert!(action.is_deleted());
        assert!(action.is_done());
    }

    #[test]
    fn reserved_names_are_rejected() {
        let ids = UidAllocator::sequential();
        assert!(Action::new(&ids, "uid=12", None, Timestamp::EPOCH).is_err());
    }
}
