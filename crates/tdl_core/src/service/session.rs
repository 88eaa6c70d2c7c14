//! One loaded document together with its allocator and undo history.
//!
//! # Responsibility
//! - Run commands against the document with per-command uid leases.
//! - Journal undoable commands with the uids and timestamp they consumed.
//! - Undo by decoding the load-time snapshot and replaying the kept prefix.
//!
//! # Invariants
//! - The snapshot bytes never change after construction.
//! - A command that fails, or leaves a broken document in paranoid mode,
//!   changes nothing: it runs against a copy that is kept only on success.
//! - Every uid in the document is registered with the session allocator.
//! - Undo followed by redo yields a byte-identical serialization.

use crate::codec::{
    deserialize_document, serialize_document, DeserializationError, SerializationError,
};
use crate::config::EngineConfig;
use crate::journal::{JournalError, Rewindable, UndoJournal};
use crate::model::auditable::Timestamp;
use crate::model::document::Document;
use crate::model::error::{DataError, DocumentError};
use crate::service::command::Command;
use crate::uid::{Uid, UidAllocator, UidLease};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Document(DocumentError),
    /// Paranoid mode found the document broken after a command.
    NotWellFormed(DataError),
    Serialize(SerializationError),
    Deserialize(DeserializationError),
    NothingToUndo,
    NothingToRedo,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document(err) => write!(f, "{err}"),
            Self::NotWellFormed(err) => write!(f, "document is not well formed: {err}"),
            Self::Serialize(err) => write!(f, "{err}"),
            Self::Deserialize(err) => write!(f, "{err}"),
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Document(err) => Some(err),
            Self::NotWellFormed(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Deserialize(err) => Some(err),
            Self::NothingToUndo | Self::NothingToRedo => None,
        }
    }
}

impl From<DocumentError> for SessionError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

impl From<SerializationError> for SessionError {
    fn from(value: SerializationError) -> Self {
        Self::Serialize(value)
    }
}

impl From<DeserializationError> for SessionError {
    fn from(value: DeserializationError) -> Self {
        Self::Deserialize(value)
    }
}

impl From<DataError> for SessionError {
    fn from(value: DataError) -> Self {
        Self::Document(DocumentError::Data(value))
    }
}

impl From<JournalError<SessionError>> for SessionError {
    fn from(value: JournalError<SessionError>) -> Self {
        match value {
            JournalError::NothingToUndo => Self::NothingToUndo,
            JournalError::NothingToRedo => Self::NothingToRedo,
            JournalError::Replay(err) => err,
        }
    }
}

/// A journaled command with everything needed to replay it verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    pub command: Command,
    pub issued_uids: Vec<Uid>,
    pub at: Timestamp,
}

/// Document state the journal rewinds and replays against.
#[derive(Clone)]
struct Workspace {
    doc: Document,
    ids: UidAllocator,
    snapshot: Arc<[u8]>,
    config: EngineConfig,
}

impl Workspace {
    fn check_if_paranoid(&self) -> SessionResult<()> {
        if self.config.paranoid {
            self.doc
                .check_is_well_formed()
                .map_err(SessionError::NotWellFormed)?;
        }
        Ok(())
    }
}

impl Rewindable for Workspace {
    type Command = RecordedCommand;
    type Error = SessionError;

    fn rewound(&self) -> SessionResult<Self> {
        let ids = UidAllocator::new(self.config.uid_mode);
        let doc = deserialize_document(&self.snapshot, &ids, &self.config.serialization)?;
        Ok(Self {
            doc,
            ids,
            snapshot: Arc::clone(&self.snapshot),
            config: self.config.clone(),
        })
    }

    fn fork(&self) -> Self {
        self.clone()
    }

    fn replay(&mut self, recorded: &RecordedCommand) -> SessionResult<()> {
        let lease = UidLease::replay(&self.ids, &recorded.issued_uids);
        recorded.command.apply(&mut self.doc, &lease, recorded.at)?;
        lease.into_issued();
        self.check_if_paranoid()
    }
}

/// A document open for editing.
pub struct Session {
    workspace: Workspace,
    journal: UndoJournal<RecordedCommand>,
}

impl Session {
    /// Starts a session on a brand-new document.
    pub fn fresh(config: EngineConfig, at: Timestamp) -> SessionResult<Self> {
        let scratch = UidAllocator::new(config.uid_mode);
        let doc = Document::new(&scratch, &config.inbox_name, at)?;
        Self::from_document(&doc, config)
    }

    /// Starts a session on a copy of `doc`, snapshotting it as the undo floor.
    pub fn from_document(doc: &Document, config: EngineConfig) -> SessionResult<Self> {
        let snapshot = serialize_document(doc, &config.serialization)?;
        Self::from_bytes(snapshot, config)
    }

    /// Starts a session on persisted checksum-envelope bytes.
    pub fn from_bytes(snapshot: Vec<u8>, config: EngineConfig) -> SessionResult<Self> {
        let ids = UidAllocator::new(config.uid_mode);
        let doc = deserialize_document(&snapshot, &ids, &config.serialization)?;
        info!(
            "event=session_open module=service status=ok snapshot_bytes={} uids={}",
            snapshot.len(),
            ids.len()
        );
        Ok(Self {
            workspace: Workspace {
                doc,
                ids,
                snapshot: snapshot.into(),
                config,
            },
            journal: UndoJournal::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.workspace.doc
    }

    pub fn allocator(&self) -> &UidAllocator {
        &self.workspace.ids
    }

    pub fn config(&self) -> &EngineConfig {
        &self.workspace.config
    }

    /// The bytes the session was opened from.
    pub fn snapshot(&self) -> &[u8] {
        &self.workspace.snapshot
    }

    /// Commands currently applied on top of the snapshot.
    pub fn history(&self) -> &[RecordedCommand] {
        self.journal.applied()
    }

    pub fn can_undo(&self) -> bool {
        self.journal.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.journal.can_redo()
    }

    /// Runs `command` stamped with the current wall-clock time.
    pub fn execute(&mut self, command: Command) -> SessionResult<Option<Uid>> {
        self.execute_at(command, Timestamp::now())
    }

    /// Runs `command` stamped with `at`; undoable commands are journaled on success.
    pub fn execute_at(&mut self, command: Command, at: Timestamp) -> SessionResult<Option<Uid>> {
        let mut workspace = self.workspace.fork();
        let lease = UidLease::fresh(&workspace.ids);
        let outcome = command.apply(&mut workspace.doc, &lease, at);
        let issued_uids = lease.into_issued();
        let created = match outcome {
            Ok(created) => created,
            Err(err) => {
                debug!(
                    "event=command module=service status=error command={} error={}",
                    command.name(),
                    err
                );
                return Err(err.into());
            }
        };
        if let Err(err) = workspace.check_if_paranoid() {
            error!(
                "event=command module=service status=error command={} error_code=not_well_formed",
                command.name()
            );
            return Err(err);
        }
        debug!(
            "event=command module=service status=ok command={} issued_uids={}",
            command.name(),
            issued_uids.len()
        );
        self.workspace = workspace;
        if command.is_undoable() {
            self.journal.register(RecordedCommand {
                command,
                issued_uids,
                at,
            });
        }
        Ok(created)
    }

    pub fn undo(&mut self) -> SessionResult<()> {
        self.journal.undo(&mut self.workspace)?;
        Ok(())
    }

    pub fn redo(&mut self) -> SessionResult<()> {
        self.journal.redo(&mut self.workspace)?;
        Ok(())
    }

    /// Serializes the current document with the session's settings.
    pub fn to_bytes(&self) -> SessionResult<Vec<u8>> {
        Ok(serialize_document(
            &self.workspace.doc,
            &self.workspace.config.serialization,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionError};
    use crate::config::EngineConfig;
    use crate::model::auditable::Timestamp;
    use crate::service::command::Command;
    use crate::uid::UidMode;

    fn session() -> Session {
        let config = EngineConfig {
            uid_mode: UidMode::Sequential,
            paranoid: true,
            ..EngineConfig::default()
        };
        Session::fresh(config, Timestamp::from_epoch_seconds(100)).unwrap()
    }

    #[test]
    fn failed_commands_are_not_journaled() {
        let mut session = session();
        let err = session
            .execute_at(
                Command::Rename {
                    uid: 999,
                    name: "x".to_string(),
                },
                Timestamp::from_epoch_seconds(101),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Document(_)));
        assert!(!session.can_undo());
    }

    #[test]
    fn failed_commands_leave_uids_unissued() {
        let mut session = session();
        let registered = session.allocator().len();
        let err = session
            .execute_at(
                Command::MakeAction {
                    name: "orphan".to_string(),
                    project: Some(999),
                    context: None,
                },
                Timestamp::from_epoch_seconds(101),
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::Document(_)));
        assert_eq!(session.allocator().len(), registered);
    }

    #[test]
    fn verify_is_not_journaled() {
        let mut session = session();
        session
            .execute_at(Command::Verify, Timestamp::from_epoch_seconds(101))
            .unwrap();
        assert!(!session.can_undo());
        assert!(matches!(session.undo(), Err(SessionError::NothingToUndo)));
    }

    #[test]
    fn undo_restores_snapshot_uids() {
        let mut session = session();
        let at = Timestamp::from_epoch_seconds(101);
        let first = session
            .execute_at(
                Command::MakeContext {
                    name: "@home".to_string(),
                },
                at,
            )
            .unwrap()
            .unwrap();
        session.undo().unwrap();
        assert!(!session.allocator().is_registered(first));
        session.redo().unwrap();
        assert!(session.document().context_by_uid(first).is_some());
    }
}
