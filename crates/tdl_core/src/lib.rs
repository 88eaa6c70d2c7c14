//! Data and persistence engine for a GTD-style to-do list.
//! This crate is the single source of truth for document invariants.

pub mod codec;
pub mod config;
pub mod db;
pub mod export;
pub mod filter;
pub mod journal;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;
pub mod uid;

pub use codec::{
    deserialize_document, deserialize_with_checksum, load_from_path, save_to_path,
    serialize_document, DeserializationError, SerializationConfig, SerializationError,
};
pub use config::{ConfigError, EngineConfig};
pub use filter::{Lookups, SearchFilter, ShowFilter, ViewFilter, ViewKind};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::auditable::{Auditable, Timestamp};
pub use model::document::{Document, ItemKind, ItemRef};
pub use model::error::{DataError, DocumentError, IllegalOperationError};
pub use repo::document_repo::{DocumentRepository, RepoError, SqliteDocumentRepository};
pub use service::command::Command;
pub use service::document_service::{DocumentService, ServiceError};
pub use service::session::{Session, SessionError};
pub use uid::{Uid, UidAllocator, UidError, UidMode, UidSource};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
