//! Typed commands that mutate a document.
//!
//! # Responsibility
//! - Name every user-level mutation as a value that can be journaled.
//! - Apply a command through the document API only.
//!
//! # Invariants
//! - Applying a command never reads the clock or draws uids from anywhere but
//!   the `ids` and `at` it is handed, so replay reproduces it exactly.
//! - Items are addressed by uid; callers resolve paths beforehand.

use crate::model::auditable::{Auditable, Timestamp};
use crate::model::document::{Document, ItemKind};
use crate::model::error::{DocumentError, DocumentResult, IllegalOperationError};
use crate::model::folder::Folder;
use crate::model::project::Project;
use crate::uid::{Uid, UidSource, INBOX_UID, ROOT_FOLDER_UID};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MakeContext {
        name: String,
    },
    RenameContext {
        context: Uid,
        name: String,
    },
    RemoveContext {
        context: Uid,
    },
    SetContextActive {
        context: Uid,
        active: bool,
    },
    /// `parent: None` places the folder under the root folder.
    MakeFolder {
        name: String,
        parent: Option<Uid>,
    },
    MakeProject {
        name: String,
        parent: Option<Uid>,
    },
    /// `project: None` files the action into the inbox.
    MakeAction {
        name: String,
        project: Option<Uid>,
        context: Option<Uid>,
    },
    Rename {
        uid: Uid,
        name: String,
    },
    SetNote {
        uid: Uid,
        note: String,
    },
    /// An empty note removes the key.
    SetGlobalNote {
        key: String,
        note: String,
    },
    Move {
        uid: Uid,
        destination: Uid,
    },
    /// Applies to actions and projects.
    SetComplete {
        uid: Uid,
        complete: bool,
    },
    SetProjectActive {
        project: Uid,
        active: bool,
    },
    SetActionContext {
        action: Uid,
        context: Option<Uid>,
    },
    SetDefaultContext {
        project: Uid,
        context: Option<Uid>,
    },
    ConfigureReview {
        project: Uid,
        max_seconds_before_review: f64,
    },
    MarkReviewed {
        project: Uid,
    },
    ClearReview {
        project: Uid,
    },
    /// `scrub` also blanks the name, note and context.
    RemoveAction {
        action: Uid,
        scrub: bool,
    },
    /// `force` deletes the live actions first instead of refusing.
    RemoveProject {
        project: Uid,
        force: bool,
    },
    RemoveFolder {
        folder: Uid,
    },
    DeleteCompleted,
    PurgeDeleted,
    /// Runs the well-formedness check; changes nothing.
    Verify,
}

impl Command {
    /// Stable name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MakeContext { .. } => "mkctx",
            Self::RenameContext { .. } => "renamectx",
            Self::RemoveContext { .. } => "rmctx",
            Self::SetContextActive { .. } => "activatectx",
            Self::MakeFolder { .. } => "mkdir",
            Self::MakeProject { .. } => "mkprj",
            Self::MakeAction { .. } => "mkact",
            Self::Rename { .. } => "rename",
            Self::SetNote { .. } => "note",
            Self::SetGlobalNote { .. } => "global_note",
            Self::Move { .. } => "mv",
            Self::SetComplete { .. } => "complete",
            Self::SetProjectActive { .. } => "activateprj",
            Self::SetActionContext { .. } => "chctx",
            Self::SetDefaultContext { .. } => "chdefaultctx",
            Self::ConfigureReview { .. } => "configreview",
            Self::MarkReviewed { .. } => "markreviewed",
            Self::ClearReview { .. } => "clearreview",
            Self::RemoveAction { .. } => "rmact",
            Self::RemoveProject { .. } => "rmprj",
            Self::RemoveFolder { .. } => "rmdir",
            Self::DeleteCompleted => "delete_completed",
            Self::PurgeDeleted => "purge_deleted",
            Self::Verify => "verify",
        }
    }

    /// Whether the command changes the document and belongs in the journal.
    pub fn is_undoable(&self) -> bool {
        !matches!(self, Self::Verify)
    }

    /// Applies the command, returning the uid of a newly created item.
    pub fn apply(
        &self,
        doc: &mut Document,
        ids: &dyn UidSource,
        at: Timestamp,
    ) -> DocumentResult<Option<Uid>> {
        match self {
            Self::MakeContext { name } => doc.add_context(ids, name, at).map(Some),
            Self::RenameContext { context, name } => {
                rename_context(doc, *context, name, at)?;
                Ok(None)
            }
            Self::RemoveContext { context } => {
                doc.remove_context(*context, at)?;
                Ok(None)
            }
            Self::SetContextActive { context, active } => {
                doc.context_mut(*context)
                    .ok_or(DocumentError::NoSuchUid(*context))?
                    .set_active(*active, at);
                Ok(None)
            }
            Self::MakeFolder { name, parent } => {
                let folder = Folder::new(ids, name.as_str(), at)?;
                doc.add_project_or_folder(folder.into(), *parent, at).map(Some)
            }
            Self::MakeProject { name, parent } => {
                let project = Project::new(ids, name.as_str(), at)?;
                doc.add_project_or_folder(project.into(), *parent, at).map(Some)
            }
            Self::MakeAction {
                name,
                project,
                context,
            } => doc
                .add_action(ids, project.unwrap_or(INBOX_UID), name, *context, at)
                .map(Some),
            Self::Rename { uid, name } => {
                rename(doc, *uid, name, at)?;
                Ok(None)
            }
            Self::SetNote { uid, note } => {
                set_note(doc, *uid, note, at)?;
                Ok(None)
            }
            Self::SetGlobalNote { key, note } => {
                doc.notes_mut().set(key.as_str(), note.as_str());
                Ok(None)
            }
            Self::Move { uid, destination } => {
                doc.move_item(*uid, *destination, at)?;
                Ok(None)
            }
            Self::SetComplete { uid, complete } => {
                set_complete(doc, *uid, *complete, at)?;
                Ok(None)
            }
            Self::SetProjectActive { project, active } => {
                project_mut(doc, *project)?.set_active(*active, at);
                Ok(None)
            }
            Self::SetActionContext { action, context } => {
                doc.set_action_context(*action, *context, at)?;
                Ok(None)
            }
            Self::SetDefaultContext { project, context } => {
                doc.set_default_context(*project, *context, at)?;
                Ok(None)
            }
            Self::ConfigureReview {
                project,
                max_seconds_before_review,
            } => {
                project_mut(doc, *project)?
                    .set_max_seconds_before_review(*max_seconds_before_review, at)?;
                Ok(None)
            }
            Self::MarkReviewed { project } => {
                project_mut(doc, *project)?.mark_reviewed(at);
                Ok(None)
            }
            Self::ClearReview { project } => {
                project_mut(doc, *project)?.clear_review(at);
                Ok(None)
            }
            Self::RemoveAction { action, scrub } => {
                expect_kind(doc, *action, ItemKind::Action, "an action")?;
                if *scrub {
                    doc.action_mut(*action)
                        .ok_or(DocumentError::NoSuchUid(*action))?
                        .almost_purge(at);
                } else {
                    doc.delete_item(*action, at)?;
                }
                Ok(None)
            }
            Self::RemoveProject { project, force } => {
                remove_project(doc, *project, *force, at)?;
                Ok(None)
            }
            Self::RemoveFolder { folder } => {
                expect_kind(doc, *folder, ItemKind::Folder, "a folder")?;
                doc.delete_item(*folder, at)?;
                Ok(None)
            }
            Self::DeleteCompleted => {
                doc.delete_completed(at);
                Ok(None)
            }
            Self::PurgeDeleted => {
                doc.purge_deleted(at);
                Ok(None)
            }
            Self::Verify => {
                doc.check_is_well_formed()?;
                Ok(None)
            }
        }
    }
}

fn kind_of(doc: &Document, uid: Uid) -> DocumentResult<ItemKind> {
    doc.item_by_uid(uid)
        .map(|item| item.kind())
        .ok_or(DocumentError::NoSuchUid(uid))
}

fn expect_kind(doc: &Document, uid: Uid, kind: ItemKind, expected: &'static str) -> DocumentResult<()> {
    if kind_of(doc, uid)? != kind {
        return Err(IllegalOperationError::WrongItemKind { uid, expected }.into());
    }
    Ok(())
}

fn project_mut(doc: &mut Document, uid: Uid) -> DocumentResult<&mut Project> {
    expect_kind(doc, uid, ItemKind::Project, "a project")?;
    doc.project_mut(uid).ok_or(DocumentError::NoSuchUid(uid))
}

fn rename_context(doc: &mut Document, uid: Uid, name: &str, at: Timestamp) -> DocumentResult<()> {
    let taken = doc
        .contexts()
        .iter()
        .any(|context| context.uid() != uid && context.name() == name);
    if taken {
        return Err(DocumentError::DuplicateContext(name.to_string()));
    }
    doc.context_mut(uid)
        .ok_or(DocumentError::NoSuchUid(uid))?
        .rename(name, at)?;
    Ok(())
}

fn rename(doc: &mut Document, uid: Uid, name: &str, at: Timestamp) -> DocumentResult<()> {
    match kind_of(doc, uid)? {
        ItemKind::Action => doc
            .action_mut(uid)
            .ok_or(DocumentError::NoSuchUid(uid))?
            .rename(name, at)?,
        ItemKind::Project => doc
            .project_mut(uid)
            .ok_or(DocumentError::NoSuchUid(uid))?
            .rename(name, at)?,
        ItemKind::Folder => doc
            .folder_mut(uid)
            .ok_or(DocumentError::NoSuchUid(uid))?
            .rename(name, at)?,
        ItemKind::Context => rename_context(doc, uid, name, at)?,
        ItemKind::ContextList => {
            return Err(IllegalOperationError::WrongItemKind {
                uid,
                expected: "renamable",
            }
            .into())
        }
    }
    Ok(())
}

fn set_note(doc: &mut Document, uid: Uid, note: &str, at: Timestamp) -> DocumentResult<()> {
    let missing = DocumentError::NoSuchUid(uid);
    match kind_of(doc, uid)? {
        ItemKind::Action => doc.action_mut(uid).ok_or(missing)?.set_note(note, at),
        ItemKind::Project => doc.project_mut(uid).ok_or(missing)?.set_note(note, at),
        ItemKind::Folder => doc.folder_mut(uid).ok_or(missing)?.set_note(note, at),
        ItemKind::Context => doc.context_mut(uid).ok_or(missing)?.set_note(note, at),
        ItemKind::ContextList => {
            return Err(IllegalOperationError::WrongItemKind {
                uid,
                expected: "annotatable",
            }
            .into())
        }
    }
    Ok(())
}

fn set_complete(doc: &mut Document, uid: Uid, complete: bool, at: Timestamp) -> DocumentResult<()> {
    match kind_of(doc, uid)? {
        ItemKind::Action => doc
            .action_mut(uid)
            .ok_or(DocumentError::NoSuchUid(uid))?
            .set_complete(complete, at),
        ItemKind::Project => doc
            .project_mut(uid)
            .ok_or(DocumentError::NoSuchUid(uid))?
            .set_complete(complete, at),
        _ => {
            return Err(IllegalOperationError::WrongItemKind {
                uid,
                expected: "an action or project",
            }
            .into())
        }
    }
    Ok(())
}

fn remove_project(doc: &mut Document, uid: Uid, force: bool, at: Timestamp) -> DocumentResult<()> {
    if uid == INBOX_UID || uid == ROOT_FOLDER_UID {
        return Err(IllegalOperationError::Irremovable(uid).into());
    }
    expect_kind(doc, uid, ItemKind::Project, "a project")?;
    if force {
        let live: Vec<Uid> = doc
            .project_by_uid(uid)
            .map(|(project, _)| {
                project
                    .items()
                    .iter()
                    .filter(|action| !action.is_deleted())
                    .map(|action| action.uid())
                    .collect()
            })
            .unwrap_or_default();
        for action in live {
            doc.delete_item(action, at)?;
        }
    }
    doc.delete_item(uid, at)
}

#[cfg(test)]
mod tests {
    use super::Command;
    use crate::model::auditable::{Auditable, Timestamp};
    use crate::model::document::Document;
    use crate::model::error::{DocumentError, IllegalOperationError};
    use crate::uid::{UidAllocator, INBOX_UID};

    fn fixture() -> (Document, UidAllocator) {
        let ids = UidAllocator::sequential();
        let doc = Document::new(&ids, "inbox", Timestamp::from_epoch_seconds(10)).unwrap();
        (doc, ids)
    }

    #[test]
    fn make_action_defaults_to_inbox() {
        let (mut doc, ids) = fixture();
        let at = Timestamp::from_epoch_seconds(20);
        let uid = Command::MakeAction {
            name: "buy milk".to_string(),
            project: None,
            context: None,
        }
        .apply(&mut doc, &ids, at)
        .unwrap()
        .unwrap();

        assert_eq!(doc.parent_of(uid), Some(INBOX_UID));
    }

    #[test]
    fn forced_inbox_removal_is_refused_before_touching_actions() {
        let (mut doc, ids) = fixture();
        let at = Timestamp::from_epoch_seconds(20);
        let milk = Command::MakeAction {
            name: "milk".to_string(),
            project: None,
            context: None,
        }
        .apply(&mut doc, &ids, at)
        .unwrap()
        .unwrap();

        let err = Command::RemoveProject {
            project: INBOX_UID,
            force: true,
        }
        .apply(&mut doc, &ids, Timestamp::from_epoch_seconds(21))
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Illegal(IllegalOperationError::Irremovable(INBOX_UID))
        ));
        let (action, _) = doc.action_by_uid(milk).unwrap();
        assert!(!action.is_deleted());
    }

    #[test]
    fn remove_project_needs_force_with_live_actions() {
        let (mut doc, ids) = fixture();
        let at = Timestamp::from_epoch_seconds(20);
        let project = Command::MakeProject {
            name: "garden".to_string(),
            parent: None,
        }
        .apply(&mut doc, &ids, at)
        .unwrap()
        .unwrap();
        Command::MakeAction {
            name: "weed".to_string(),
            project: Some(project),
            context: None,
        }
        .apply(&mut doc, &ids, at)
        .unwrap();

        let err = Command::RemoveProject {
            project,
            force: false,
        }
        .apply(&mut doc, &ids, at)
        .unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Illegal(IllegalOperationError::UndeletedDescendant { .. })
        ));

        Command::RemoveProject {
            project,
            force: true,
        }
        .apply(&mut doc, &ids, at)
        .unwrap();
        let (removed, _) = doc.project_by_uid(project).unwrap();
        assert!(removed.is_deleted());
        assert!(removed.items().iter().all(|action| action.is_deleted()));
    }

    #[test]
    fn rename_context_rejects_taken_name() {
        let (mut doc, ids) = fixture();
        let at = Timestamp::from_epoch_seconds(20);
        doc.add_context(&ids, "@home", at).unwrap();
        let work = doc.add_context(&ids, "@work", at).unwrap();

        let err = Command::RenameContext {
            context: work,
            name: "@home".to_string(),
        }
        .apply(&mut doc, &ids, at)
        .unwrap_err();
        assert_eq!(err, DocumentError::DuplicateContext("@home".to_string()));
    }

    #[test]
    fn only_verify_is_not_undoable() {
        assert!(!Command::Verify.is_undoable());
        assert!(Command::PurgeDeleted.is_undoable());
    }
}
