//! Folder container of folders and projects.

use super::auditable::{Audit, Auditable, Timestamp};
use super::error::DataResult;
use super::naming::validate_name;
use super::project::Project;
use crate::uid::{Uid, UidSource};

/// Child of a folder; the only two kinds a folder may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderItem {
    Folder(Folder),
    Project(Project),
}

impl Auditable for FolderItem {
    fn audit(&self) -> &Audit {
        match self {
            Self::Folder(folder) => folder.audit(),
            Self::Project(project) => project.audit(),
        }
    }

    fn audit_mut(&mut self) -> &mut Audit {
        match self {
            Self::Folder(folder) => folder.audit_mut(),
            Self::Project(project) => project.audit_mut(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => folder.name(),
            Self::Project(project) => project.name(),
        }
    }

    fn note(&self) -> &str {
        match self {
            Self::Folder(folder) => folder.note(),
            Self::Project(project) => project.note(),
        }
    }
}

impl From<Folder> for FolderItem {
    fn from(value: Folder) -> Self {
        Self::Folder(value)
    }
}

impl From<Project> for FolderItem {
    fn from(value: Project) -> Self {
        Self::Project(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    audit: Audit,
    name: String,
    note: String,
    pub(crate) items: Vec<FolderItem>,
}

impl Folder {
    pub fn new(ids: &dyn UidSource, name: impl Into<String>, at: Timestamp) -> DataResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        let uid = ids.next_uid()?;
        Self::with_uid(uid, name, at)
    }

    /// Builds a folder with a predetermined uid (the root).
    pub(crate) fn with_uid(uid: Uid, name: String, at: Timestamp) -> DataResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            audit: Audit::new(uid, at)?,
            name,
            note: String::new(),
            items: Vec::new(),
        })
    }

    pub fn restore(
        audit: Audit,
        name: String,
        note: String,
        items: Vec<FolderItem>,
    ) -> DataResult<Self> {
        validate_name(&name)?;
        Ok(Self {
            audit,
            name,
            note,
            items,
        })
    }

    pub fn items(&self) -> &[FolderItem] {
        &self.items
    }

    /// Folders are never completed, only deleted.
    pub fn is_done(&self) -> bool {
        self.is_deleted()
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

    pub(crate) fn push_item(&mut self, item: FolderItem, at: Timestamp) {
        self.items.push(item);
        self.audit.touch(at);
    }

    pub(crate) fn take_item(&mut self, uid: Uid, at: Timestamp) -> Option<FolderItem> {
        let index = self.items.iter().position(|item| item.uid() == uid)?;
        self.audit.touch(at);
        Some(self.items.remove(index))
    }
}

impl Auditable for Folder {
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
