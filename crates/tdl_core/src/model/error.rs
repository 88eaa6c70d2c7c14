//! Error kinds shared by the domain model.

use super::naming::UidSyntaxError;
use crate::uid::{Uid, UidError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DataResult<T> = Result<T, DataError>;

/// Input or stored data breaks a fundamental constraint.
///
/// Always surfaced to the caller; never silently corrected.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// Allocation or registration of a uid failed.
    Uid(UidError),
    /// A fixed-identity object carries the wrong uid.
    UnexpectedUid { role: &'static str, expected: Uid, actual: Uid },
    /// Two objects in one document share a uid.
    DuplicateUid(Uid),
    /// A weak reference names a uid with no matching context.
    DanglingContextReference { holder: Uid, context: Uid },
    /// Timestamp other than the `-1` absence marker is negative.
    NegativeTimestamp(i64),
    /// A required timestamp is absent.
    MissingTimestamp { uid: Uid, field: &'static str },
    /// `ctime` is later than `mtime` or `dtime`.
    TimestampOrder { uid: Uid },
    /// `dtime` presence disagrees with the deletion flag.
    DeletionTimestampMismatch { uid: Uid },
    /// The name collides with the reserved `uid=` syntax.
    ReservedName(String),
    /// A required name is empty.
    EmptyName(&'static str),
    /// The supposed child is not a child of the container.
    NotAChild { container: Uid, child: Uid },
    /// Review interval must be a non-negative, finite number of seconds.
    InvalidReviewInterval(f64),
    /// Two global notes share a key.
    DuplicateNoteKey(String),
}

impl Display for DataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uid(err) => write!(f, "{err}"),
            Self::UnexpectedUid {
                role,
                expected,
                actual,
            } => write!(f, "{role} uid is not {expected}, it is {actual}"),
            Self::DuplicateUid(uid) => write!(f, "uid {uid} was used for two different objects"),
            Self::DanglingContextReference { holder, context } => write!(
                f,
                "object {holder} references context {context} but that context does not exist"
            ),
            Self::NegativeTimestamp(value) => write!(f, "a timestamp was negative: {value}"),
            Self::MissingTimestamp { uid, field } => {
                write!(f, "object {uid} is missing its {field}")
            }
            Self::TimestampOrder { uid } => {
                write!(f, "object {uid} has ctime later than mtime or dtime")
            }
            Self::DeletionTimestampMismatch { uid } => write!(
                f,
                "object {uid} has a deletion time that disagrees with its deletion flag"
            ),
            Self::ReservedName(name) => {
                write!(f, "names starting with \"uid=\" are prohibited: `{name}`")
            }
            Self::EmptyName(kind) => write!(f, "every {kind} must have a name"),
            Self::NotAChild { container, child } => write!(
                f,
                "object {child} is not really a child of container {container}"
            ),
            Self::InvalidReviewInterval(value) => {
                write!(f, "review interval must be finite and >= 0, got {value}")
            }
            Self::DuplicateNoteKey(key) => write!(f, "global note `{key}` appears twice"),
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Uid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UidError> for DataError {
    fn from(value: UidError) -> Self {
        Self::Uid(value)
    }
}

/// The requested structural change is not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalOperationError {
    /// A descendant of the target is still live.
    UndeletedDescendant { target: Uid, descendant: Uid },
    /// Item cannot be moved into itself or one of its descendants.
    MoveIntoSelf(Uid),
    /// Live items cannot move into a deleted container.
    MoveIntoDeleted { item: Uid, container: Uid },
    /// The destination cannot hold this kind of item.
    WrongDestinationKind { item: Uid, destination: Uid },
    /// The inbox and the root folder stay where they are.
    Immovable(Uid),
    /// The inbox and the root folder cannot be removed.
    Irremovable(Uid),
    /// Projects, the inbox included, never hold folders or projects.
    ProjectCannotContainContainers(Uid),
    /// New actions cannot go into a deleted project.
    DeletedProject(Uid),
    /// The command does not apply to this kind of item.
    WrongItemKind { uid: Uid, expected: &'static str },
}

impl Display for IllegalOperationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndeletedDescendant { target, descendant } => write!(
                f,
                "cannot delete {target} because descendant {descendant} is not deleted"
            ),
            Self::MoveIntoSelf(uid) => write!(f, "cannot move {uid} into itself"),
            Self::MoveIntoDeleted { item, container } => write!(
                f,
                "cannot move undeleted item {item} into deleted container {container}"
            ),
            Self::WrongDestinationKind { item, destination } => write!(
                f,
                "container {destination} cannot hold item {item}"
            ),
            Self::Immovable(uid) => write!(f, "container {uid} cannot be moved"),
            Self::Irremovable(uid) => write!(f, "container {uid} is special; it cannot be removed"),
            Self::ProjectCannotContainContainers(uid) => {
                write!(f, "project {uid} cannot contain folders or projects")
            }
            Self::DeletedProject(uid) => {
                write!(f, "cannot add an action to deleted project {uid}")
            }
            Self::WrongItemKind { uid, expected } => {
                write!(f, "item {uid} is not {expected}")
            }
        }
    }
}

impl Error for IllegalOperationError {}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// Any failure of a document-level operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    Data(DataError),
    Illegal(IllegalOperationError),
    /// No action, project, folder or context carries this uid.
    NoSuchUid(Uid),
    /// No object answers to this name or path.
    NoSuchName(String),
    /// The parent uid does not name a folder.
    NoSuchParentFolder(Uid),
    /// A context by that name already exists.
    DuplicateContext(String),
    UidSyntax(UidSyntaxError),
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Data(err) => write!(f, "{err}"),
            Self::Illegal(err) => write!(f, "{err}"),
            Self::NoSuchUid(uid) => write!(f, "no item with uid {uid} exists"),
            Self::NoSuchName(name) => write!(f, "no such name or path: `{name}`"),
            Self::NoSuchParentFolder(uid) => write!(f, "no parent folder with uid {uid}"),
            Self::DuplicateContext(name) => {
                write!(f, "a context named `{name}` already exists")
            }
            Self::UidSyntax(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Data(err) => Some(err),
            Self::Illegal(err) => Some(err),
            Self::UidSyntax(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DataError> for DocumentError {
    fn from(value: DataError) -> Self {
        Self::Data(value)
    }
}

impl From<UidError> for DocumentError {
    fn from(value: UidError) -> Self {
        Self::Data(DataError::Uid(value))
    }
}

impl From<IllegalOperationError> for DocumentError {
    fn from(value: IllegalOperationError) -> Self {
        Self::Illegal(value)
    }
}

impl From<UidSyntaxError> for DocumentError {
    fn from(value: UidSyntaxError) -> Self {
        Self::UidSyntax(value)
    }
}
