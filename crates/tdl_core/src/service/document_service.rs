//! Load and save sessions through a document repository.
//!
//! # Invariants
//! - An owner without a stored document gets a fresh one; nothing is written
//!   until the first save.
//! - Only bytes that passed the serialization self-test reach the repository.

use crate::config::EngineConfig;
use crate::model::auditable::Timestamp;
use crate::repo::document_repo::{DocumentRepository, RepoError};
use crate::service::session::{Session, SessionError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    Session(SessionError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Session(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<SessionError> for ServiceError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

pub struct DocumentService<R: DocumentRepository> {
    repo: R,
    config: EngineConfig,
}

impl<R: DocumentRepository> DocumentService<R> {
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Opens the owner's document, or a fresh one stamped `at` when none is stored.
    pub fn load_session(&self, owner: &str, at: Timestamp) -> ServiceResult<Session> {
        match self.repo.load_blob(owner)? {
            Some(bytes) if !bytes.is_empty() => {
                Ok(Session::from_bytes(bytes, self.config.clone())?)
            }
            _ => {
                info!("event=session_load module=service status=ok mode=fresh");
                Ok(Session::fresh(self.config.clone(), at)?)
            }
        }
    }

    pub fn save_session(&self, owner: &str, session: &Session) -> ServiceResult<()> {
        let bytes = session.to_bytes()?;
        self.repo.save_blob(owner, &bytes)?;
        Ok(())
    }

    pub fn delete(&self, owner: &str) -> ServiceResult<()> {
        self.repo.delete(owner)?;
        Ok(())
    }
}
