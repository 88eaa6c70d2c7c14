//! Contexts ("@home", "@phone") and the single list holding them.

use super::auditable::{Audit, Auditable, Timestamp};
use super::error::{DataError, DataResult};
use super::naming::validate_name;
use crate::uid::{Uid, UidSource};

/// Fixed name of the one context list in every document.
pub const CONTEXT_LIST_NAME: &str = "Contexts";

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    audit: Audit,
    name: String,
    note: String,
    is_active: bool,
}

impl Context {
    pub fn new(ids: &dyn UidSource, name: impl Into<String>, at: Timestamp) -> DataResult<Self> {
        let name = name.into();
        validate_context_name(&name)?;
        let audit = Audit::new(ids.next_uid()?, at)?;
        Ok(Self {
            audit,
            name,
            note: String::new(),
            is_active: true,
        })
    }

    pub fn restore(audit: Audit, name: String, note: String, is_active: bool) -> DataResult<Self> {
        validate_context_name(&name)?;
        Ok(Self {
            audit,
            name,
            note,
            is_active,
        })
    }

    /// Inactive contexts hold "someday/maybe" work.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Contexts are never completed, only deleted.
    pub fn is_done(&self) -> bool {
        self.is_deleted()
    }

    pub fn rename(&mut self, name: impl Into<String>, at: Timestamp) -> DataResult<()> {
        let name = name.into();
        validate_context_name(&name)?;
        self.name = name;
        self.audit.touch(at);
        Ok(())
    }

    pub fn set_note(&mut self, note: impl Into<String>, at: Timestamp) {
        self.note = note.into();
        self.audit.touch(at);
    }

    pub fn set_active(&mut self, active: bool, at: Timestamp) {
        self.is_active = active;
        self.audit.touch(at);
    }
}

impl Auditable for Context {
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

fn validate_context_name(name: &str) -> DataResult<()> {
    if name.is_empty() {
        return Err(DataError::EmptyName("context"));
    }
    validate_name(name)
}

/// Ordered contexts of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextList {
    audit: Audit,
    pub(crate) items: Vec<Context>,
}

impl ContextList {
    pub fn new(ids: &dyn UidSource, at: Timestamp) -> DataResult<Self> {
        Ok(Self {
            audit: Audit::new(ids.next_uid()?, at)?,
            items: Vec::new(),
        })
    }

    pub fn restore(audit: Audit, items: Vec<Context>) -> Self {
        Self { audit, items }
    }

    pub fn items(&self) -> &[Context] {
        &self.items
    }

    pub fn by_uid(&self, uid: Uid) -> Option<&Context> {
        self.items.iter().find(|context| context.uid() == uid)
    }

    pub fn by_uid_mut(&mut self, uid: Uid) -> Option<&mut Context> {
        self.items.iter_mut().find(|context| context.uid() == uid)
    }

    /// Exact, case-sensitive name match; live contexts win over deleted ones.
    pub fn by_name(&self, name: &str) -> Option<&Context> {
        super::pick_by_name(self.items.iter().filter(|context| context.name() == name))
    }

    pub(crate) fn push(&mut self, context: Context, at: Timestamp) {
        self.items.push(context);
        self.audit.touch(at);
    }
}

impl Auditable for ContextList {
    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn name(&self) -> &str {
        CONTEXT_LIST_NAME
    }

    fn note(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::Context;
    use crate::model::auditable::Timestamp;
    use crate::model::error::DataError;
    use crate::uid::UidAllocator;

    #[test]
    fn context_names_must_be_non_empty() {
        let ids = UidAllocator::sequential();
        assert_eq!(
            Context::new(&ids, "", Timestamp::EPOCH).unwrap_err(),
            DataError::EmptyName("context")
        );
        assert!(ids.is_empty());
    }
}
