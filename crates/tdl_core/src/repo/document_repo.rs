//! Document blob storage keyed by owner.
//!
//! # Responsibility
//! - Store one serialized document per owner in `todo_lists`.
//! - Keep SQL inside the persistence boundary; callers see bytes only.
//!
//! # Invariants
//! - Owners are non-empty strings.
//! - `created_at` is set once; `updated_at` moves on every save.
//! - Saves are a single upsert statement; concurrent writers are
//!   last-writer-wins.

use crate::db::DbError;
use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(String),
    InvalidOwner,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(owner) => write!(f, "no document stored for owner `{owner}`"),
            Self::InvalidOwner => write!(f, "owner must not be empty"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidOwner => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for serialized documents.
pub trait DocumentRepository {
    /// `None` when the owner has never saved.
    fn load_blob(&self, owner: &str) -> RepoResult<Option<Vec<u8>>>;
    fn save_blob(&self, owner: &str, contents: &[u8]) -> RepoResult<()>;
    fn delete(&self, owner: &str) -> RepoResult<()>;
}

pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Owners with a stored document, sorted.
    pub fn owners(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT owner FROM todo_lists ORDER BY owner ASC;")?;
        let owners = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(owners)
    }
}

fn require_owner(owner: &str) -> RepoResult<()> {
    if owner.is_empty() {
        return Err(RepoError::InvalidOwner);
    }
    Ok(())
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn load_blob(&self, owner: &str) -> RepoResult<Option<Vec<u8>>> {
        require_owner(owner)?;
        let contents = self
            .conn
            .query_row(
                "SELECT contents FROM todo_lists WHERE owner = ?1;",
                params![owner],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        debug!(
            "event=document_load module=repo status=ok found={}",
            contents.is_some()
        );
        Ok(contents)
    }

    fn save_blob(&self, owner: &str, contents: &[u8]) -> RepoResult<()> {
        require_owner(owner)?;
        let now_ms = Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO todo_lists (owner, contents, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(owner) DO UPDATE SET
                contents = excluded.contents,
                updated_at = excluded.updated_at;",
            params![owner, contents, now_ms],
        )?;
        info!(
            "event=document_save module=repo status=ok bytes={}",
            contents.len()
        );
        Ok(())
    }

    fn delete(&self, owner: &str) -> RepoResult<()> {
        require_owner(owner)?;
        let changed = self
            .conn
            .execute("DELETE FROM todo_lists WHERE owner = ?1;", params![owner])?;
        if changed == 0 {
            return Err(RepoError::NotFound(owner.to_string()));
        }
        info!("event=document_delete module=repo status=ok");
        Ok(())
    }
}
