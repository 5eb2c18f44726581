//! SQLite-backed relational store.
//!
//! Owns the schema and enforces every uniqueness and foreign-key rule the
//! ingestion cascade relies on:
//! - `repositories`: UNIQUE(owner_id, name), the unit of mutual exclusion
//! - `commits`: UNIQUE(repository_id, hash)
//! - `files`: UNIQUE(repository_id, path)
//! - `branches`: UNIQUE(repository_id, name, kind)
//! - `contributors`: UNIQUE(repository_id, name)
//!
//! Writes for an ingestion go through `IngestTx` (see `ingest_tx.rs`); the
//! read side lives in `queries.rs`.

mod ingest_tx;
mod queries;

pub use ingest_tx::IngestTx;

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{AppError, Result};
use crate::models::{Language, LanguageId, User, UserId};
use crate::validation::ActorDirectory;

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY,
  username TEXT NOT NULL UNIQUE,
  token TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS languages (
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE,
  extension TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS repositories (
  id INTEGER PRIMARY KEY,
  owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  description TEXT NOT NULL,
  created_at_ms INTEGER NOT NULL,
  UNIQUE (owner_id, name)
);

CREATE TABLE IF NOT EXISTS repository_languages (
  repository_id INTEGER NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
  language_id INTEGER NOT NULL REFERENCES languages(id),
  PRIMARY KEY (repository_id, language_id)
);

CREATE TABLE IF NOT EXISTS contributors (
  id INTEGER PRIMARY KEY,
  repository_id INTEGER NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  UNIQUE (repository_id, name)
);

CREATE TABLE IF NOT EXISTS branches (
  id INTEGER PRIMARY KEY,
  repository_id INTEGER NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  kind TEXT NOT NULL CHECK (kind IN ('local', 'remote')),
  UNIQUE (repository_id, name, kind)
);

CREATE TABLE IF NOT EXISTS commits (
  id INTEGER PRIMARY KEY,
  repository_id INTEGER NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
  contributor_id INTEGER NOT NULL REFERENCES contributors(id) ON DELETE CASCADE,
  title TEXT NOT NULL,
  content TEXT NOT NULL,
  hash TEXT NOT NULL,
  created_at INTEGER NOT NULL,
  UNIQUE (repository_id, hash)
);

CREATE TABLE IF NOT EXISTS commit_branches (
  commit_id INTEGER NOT NULL REFERENCES commits(id) ON DELETE CASCADE,
  branch_id INTEGER NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
  PRIMARY KEY (commit_id, branch_id)
);

CREATE TABLE IF NOT EXISTS files (
  id INTEGER PRIMARY KEY,
  repository_id INTEGER NOT NULL REFERENCES repositories(id) ON DELETE CASCADE,
  name TEXT NOT NULL,
  size INTEGER,
  path TEXT NOT NULL,
  language_id INTEGER REFERENCES languages(id),
  UNIQUE (repository_id, path)
);

CREATE TABLE IF NOT EXISTS modifications (
  id INTEGER PRIMARY KEY,
  commit_id INTEGER NOT NULL REFERENCES commits(id) ON DELETE CASCADE,
  file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
  kind TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_modifications_commit ON modifications(commit_id);
CREATE INDEX IF NOT EXISTS idx_modifications_file ON modifications(file_id);
"#;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

pub type SharedStore = Arc<Mutex<SqliteStore>>;

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn create_user(&mut self, username: &str, token: &str) -> Result<UserId> {
        self.conn
            .execute(
                "INSERT INTO users (username, token) VALUES (?1, ?2)",
                params![username, token],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!("User '{}' or its token already exists", username))
                } else {
                    e.into()
                }
            })?;
        Ok(UserId(self.conn.last_insert_rowid()))
    }

    pub fn create_language(&mut self, name: &str, extension: &str) -> Result<LanguageId> {
        let extension = extension.trim_start_matches('.');
        self.conn
            .execute(
                "INSERT INTO languages (name, extension) VALUES (?1, ?2)",
                params![name, extension],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "Language '{}' or extension '{}' already registered",
                        name, extension
                    ))
                } else {
                    e.into()
                }
            })?;
        Ok(LanguageId(self.conn.last_insert_rowid()))
    }

    pub fn languages(&self) -> Result<Vec<Language>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, extension FROM languages ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Language {
                id: LanguageId(row.get(0)?),
                name: row.get(1)?,
                extension: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Opens the scoped transaction an ingestion writes through. Dropping the
    /// returned `IngestTx` without calling `commit` rolls everything back.
    pub fn begin_ingest(&mut self) -> Result<IngestTx<'_>> {
        Ok(IngestTx::new(self.conn.transaction()?))
    }
}

impl ActorDirectory for SqliteStore {
    fn resolve_actor(&self, token: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username FROM users WHERE token = ?1",
                params![token],
                |row| {
                    Ok(User {
                        id: UserId(row.get(0)?),
                        username: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_on_disk_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("repohub.db");

        let mut store = SqliteStore::open(&path).unwrap();
        store.create_user("alice", "tok-alice").unwrap();
        drop(store);

        let store = SqliteStore::open(&path).unwrap();
        let actor = store.resolve_actor("tok-alice").unwrap().unwrap();
        assert_eq!(actor.username, "alice");
    }

    #[test]
    fn test_resolve_unknown_token() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.resolve_actor("nope").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_user_is_conflict() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_user("alice", "t1").unwrap();
        let err = store.create_user("alice", "t2").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_language_extension_strips_dot() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_language("Rust", ".rs").unwrap();
        let langs = store.languages().unwrap();
        assert_eq!(langs.len(), 1);
        assert_eq!(langs[0].extension, "rs");
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let owner = store.create_user("alice", "t").unwrap();
        {
            let tx = store.begin_ingest().unwrap();
            tx.create_repository(owner, "demo", "").unwrap();
        }
        assert_eq!(store.count_repositories().unwrap(), 0);
    }

    #[test]
    fn test_unique_owner_name_is_conflict() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let owner = store.create_user("alice", "t").unwrap();

        let tx = store.begin_ingest().unwrap();
        tx.create_repository(owner, "demo", "first").unwrap();
        tx.commit().unwrap();

        let tx = store.begin_ingest().unwrap();
        let err = tx.create_repository(owner, "demo", "second").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        drop(tx);

        assert_eq!(store.count_repositories().unwrap(), 1);
        let repo = store.find_repository(owner, "demo").unwrap().unwrap();
        assert_eq!(repo.description, "first");
    }

    #[test]
    fn test_same_name_for_different_owners() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let alice = store.create_user("alice", "ta").unwrap();
        let bob = store.create_user("bob", "tb").unwrap();

        let tx = store.begin_ingest().unwrap();
        tx.create_repository(alice, "demo", "").unwrap();
        tx.create_repository(bob, "demo", "").unwrap();
        tx.commit().unwrap();

        assert_eq!(store.count_repositories().unwrap(), 2);
        assert!(store.find_repository_by_username("bob", "demo").unwrap().is_some());
    }

    #[test]
    fn test_foreign_keys_are_enforced() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let tx = store.begin_ingest().unwrap();
        let err = tx.create_contributor(crate::models::RepositoryId(999), "ghost");
        assert!(err.is_err());
    }
}
