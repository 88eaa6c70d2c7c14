//! Persisted shapes of the document and the conversions to and from the model.
//!
//! # Invariants
//! - Timestamps are microseconds since the epoch; `-1` marks absence.
//! - Uid `0` in a weak-reference slot marks absence.
//! - Every decoded uid is registered with the caller's [`UidSource`].

use super::DeserializationError;
use crate::model::action::Action;
use crate::model::auditable::{Audit, Auditable, Timestamp};
use crate::model::context::{Context, ContextList};
use crate::model::document::Document;
use crate::model::error::DataError;
use crate::model::folder::{Folder, FolderItem};
use crate::model::note::NoteMap;
use crate::model::project::{Project, ProjectState};
use crate::uid::{Uid, UidSource, ABSENT_UID};
use serde::{Deserialize, Serialize};

const ABSENT_TIMESTAMP: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireTimestamps {
    pub ctime: i64,
    pub dtime: i64,
    pub mtime: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireMetadata {
    pub name: String,
    pub note: String,
}

/// Block shared by every persisted entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireCommon {
    pub is_deleted: bool,
    pub timestamps: WireTimestamps,
    pub uid: Uid,
    pub metadata: WireMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireAction {
    pub common: WireCommon,
    pub is_complete: bool,
    pub ctx_uid: Uid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireContext {
    pub common: WireCommon,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireProject {
    pub common: WireCommon,
    pub is_complete: bool,
    pub is_active: bool,
    pub default_context_uid: Uid,
    pub max_seconds_before_review: f64,
    pub last_review_epoch_seconds: f64,
    pub actions: Vec<WireAction>,
}

/// Folder children share one list so their order survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) enum WireFolderItem {
    Folder(WireFolder),
    Project(WireProject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireFolder {
    pub common: WireCommon,
    pub items: Vec<WireFolderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireContextList {
    pub common: WireCommon,
    pub contexts: Vec<WireContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireNote {
    pub name: String,
    pub note: String,
}

/// Top-level record; `None` in a required slot is a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct WireDocument {
    pub inbox: Option<WireProject>,
    pub root: Option<WireFolder>,
    pub ctx_list: Option<WireContextList>,
    pub note_list: Vec<WireNote>,
}

impl WireDocument {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            inbox: Some(WireProject::from_project(doc.inbox())),
            root: Some(WireFolder::from_folder(doc.root())),
            ctx_list: Some(WireContextList {
                common: WireCommon::from_entity(doc.ctx_list()),
                contexts: doc.contexts().iter().map(WireContext::from_context).collect(),
            }),
            note_list: doc
                .notes()
                .iter()
                .map(|(name, note)| WireNote {
                    name: name.to_string(),
                    note: note.to_string(),
                })
                .collect(),
        }
    }

    pub fn into_document(self, ids: &dyn UidSource) -> Result<Document, DeserializationError> {
        let inbox = self.inbox.ok_or(DeserializationError::MissingField("inbox"))?;
        let root = self.root.ok_or(DeserializationError::MissingField("root"))?;
        let ctx_list = self
            .ctx_list
            .ok_or(DeserializationError::MissingField("ctx_list"))?;

        let (list_audit, _, _) = ctx_list.common.into_parts(ids)?;
        let contexts = ctx_list
            .contexts
            .into_iter()
            .map(|context| context.into_context(ids))
            .collect::<Result<Vec<_>, _>>()?;
        let inbox = inbox.into_project(ids)?;
        let root = root.into_folder(ids)?;
        let notes = NoteMap::from_entries(
            self.note_list
                .into_iter()
                .map(|note| (note.name, note.note)),
        )?;

        Ok(Document::from_parts(
            inbox,
            root,
            ContextList::restore(list_audit, contexts),
            notes,
        )?)
    }
}

impl WireCommon {
    fn from_entity(entity: &impl Auditable) -> Self {
        let audit = entity.audit();
        Self {
            is_deleted: audit.is_deleted(),
            timestamps: WireTimestamps {
                ctime: audit.ctime().as_micros(),
                dtime: audit
                    .dtime()
                    .map_or(ABSENT_TIMESTAMP, Timestamp::as_micros),
                mtime: audit.mtime().as_micros(),
            },
            uid: audit.uid(),
            metadata: WireMetadata {
                name: entity.name().to_string(),
                note: entity.note().to_string(),
            },
        }
    }

    /// Registers the uid and rebuilds validated bookkeeping plus name and note.
    fn into_parts(self, ids: &dyn UidSource) -> Result<(Audit, String, String), DeserializationError> {
        ids.note_existing_uid(self.uid)?;
        let uid = self.uid;
        let ctime = required_timestamp(self.timestamps.ctime, uid, "ctime")?;
        let mtime = required_timestamp(self.timestamps.mtime, uid, "mtime")?;
        let dtime = optional_timestamp(self.timestamps.dtime)?;
        let audit = Audit::restore(uid, ctime, mtime, dtime, self.is_deleted)?;
        Ok((audit, self.metadata.name, self.metadata.note))
    }
}

fn optional_timestamp(value: i64) -> Result<Option<Timestamp>, DataError> {
    match value {
        ABSENT_TIMESTAMP => Ok(None),
        negative if negative < 0 => Err(DataError::NegativeTimestamp(negative)),
        micros => Ok(Some(Timestamp::from_micros(micros))),
    }
}

fn required_timestamp(value: i64, uid: Uid, field: &'static str) -> Result<Timestamp, DataError> {
    optional_timestamp(value)?.ok_or(DataError::MissingTimestamp { uid, field })
}

fn weak_reference(uid: Option<Uid>) -> Uid {
    uid.unwrap_or(ABSENT_UID)
}

fn from_weak_reference(uid: Uid) -> Option<Uid> {
    (uid != ABSENT_UID).then_some(uid)
}

impl WireAction {
    fn from_action(action: &Action) -> Self {
        Self {
            common: WireCommon::from_entity(action),
            is_complete: action.is_complete(),
            ctx_uid: weak_reference(action.context_uid()),
        }
    }

    fn into_action(self, ids: &dyn UidSource) -> Result<Action, DeserializationError> {
        let (audit, name, note) = self.common.into_parts(ids)?;
        Ok(Action::restore(
            audit,
            name,
            note,
            self.is_complete,
            from_weak_reference(self.ctx_uid),
        )?)
    }
}

impl WireContext {
    fn from_context(context: &Context) -> Self {
        Self {
            common: WireCommon::from_entity(context),
            is_active: context.is_active(),
        }
    }

    fn into_context(self, ids: &dyn UidSource) -> Result<Context, DeserializationError> {
        let (audit, name, note) = self.common.into_parts(ids)?;
        Ok(Context::restore(audit, name, note, self.is_active)?)
    }
}

impl WireProject {
    fn from_project(project: &Project) -> Self {
        Self {
            common: WireCommon::from_entity(project),
            is_complete: project.is_complete(),
            is_active: project.is_active(),
            default_context_uid: weak_reference(project.default_context_uid()),
            max_seconds_before_review: project.max_seconds_before_review(),
            last_review_epoch_seconds: project.last_review_epoch_sec(),
            actions: project.items().iter().map(WireAction::from_action).collect(),
        }
    }

    fn into_project(self, ids: &dyn UidSource) -> Result<Project, DeserializationError> {
        let (audit, name, note) = self.common.into_parts(ids)?;
        let actions = self
            .actions
            .into_iter()
            .map(|action| action.into_action(ids))
            .collect::<Result<Vec<_>, _>>()?;
        let state = ProjectState {
            name,
            note,
            is_complete: self.is_complete,
            is_active: self.is_active,
            default_context_uid: from_weak_reference(self.default_context_uid),
            max_seconds_before_review: self.max_seconds_before_review,
            last_review_epoch_sec: self.last_review_epoch_seconds,
        };
        Ok(Project::restore(audit, state, actions)?)
    }
}

impl WireFolder {
    fn from_folder(folder: &Folder) -> Self {
        Self {
            common: WireCommon::from_entity(folder),
            items: folder
                .items()
                .iter()
                .map(|item| match item {
                    FolderItem::Folder(child) => WireFolderItem::Folder(Self::from_folder(child)),
                    FolderItem::Project(project) => {
                        WireFolderItem::Project(WireProject::from_project(project))
                    }
                })
                .collect(),
        }
    }

    fn into_folder(self, ids: &dyn UidSource) -> Result<Folder, DeserializationError> {
        let (audit, name, note) = self.common.into_parts(ids)?;
        let items = self
            .items
            .into_iter()
            .map(|item| match item {
                WireFolderItem::Folder(child) => child.into_folder(ids).map(FolderItem::Folder),
                WireFolderItem::Project(project) => {
                    project.into_project(ids).map(FolderItem::Project)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Folder::restore(audit, name, note, items)?)
    }
}
