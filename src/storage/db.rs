//! SQLite storage layer for the commit log

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::models::{CommitMetadata, CommitRecord, InsertOutcome};

/// How long a writer waits on another invocation's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS commits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        commit_hash TEXT NOT NULL UNIQUE,
        timestamp INTEGER NOT NULL,
        repo_path TEXT NOT NULL,
        commit_message TEXT NOT NULL,
        author_name TEXT NOT NULL,
        author_email TEXT NOT NULL,
        branch_name TEXT,
        files_changed INTEGER NOT NULL CHECK (files_changed >= 0),
        created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    -- Indexes for cross-repository queries
    CREATE INDEX IF NOT EXISTS idx_repo_path ON commits(repo_path);
    CREATE INDEX IF NOT EXISTS idx_timestamp ON commits(timestamp);
    CREATE INDEX IF NOT EXISTS idx_author_email ON commits(author_email);
    CREATE INDEX IF NOT EXISTS idx_branch_name ON commits(branch_name);
    CREATE INDEX IF NOT EXISTS idx_created_at ON commits(created_at);
"#;

/// Errors raised by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The SQLite engine reported a failure (permissions, disk space, corruption).
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The directory that should hold the database could not be created.
    #[error("Database error: could not create {}: {source}", path.display())]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database at `path`, creating parent directories
    /// and the schema as needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open the database only if the file is already on disk.
    ///
    /// Returns `Ok(None)` without touching the filesystem when there is no
    /// file at `path`.
    pub fn open_existing(path: &Path) -> StoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        Self::from_connection(conn).map(Some)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.ensure_schema()?;
        Ok(db)
    }

    /// Create the `commits` table and its indexes if they are missing.
    ///
    /// Idempotent; never drops or rewrites existing data.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.commit()?;
        tracing::debug!("schema ready");
        Ok(())
    }

    // ==================== Commits ====================

    /// Insert a commit unless one with the same hash is already recorded.
    pub fn insert_commit(&self, commit: &CommitMetadata) -> StoreResult<InsertOutcome> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            r#"
            INSERT INTO commits (commit_hash, timestamp, repo_path, commit_message, author_name, author_email, branch_name, files_changed)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(commit_hash) DO NOTHING
            "#,
            params![
                commit.commit_hash,
                commit.timestamp,
                commit.repo_path,
                commit.commit_message,
                commit.author_name,
                commit.author_email,
                commit.branch_name,
                commit.files_changed,
            ],
        )?;
        tx.commit()?;

        let outcome = if changed > 0 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyPresent
        };
        tracing::debug!(hash = %commit.commit_hash, %outcome, "insert");
        Ok(outcome)
    }

    /// Delete the commit whose hash matches `commit_hash` exactly.
    ///
    /// Returns whether a row was removed.
    pub fn delete_commit(&self, commit_hash: &str) -> StoreResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM commits WHERE commit_hash = ?1",
            params![commit_hash],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Get a commit by its full hash
    pub fn get_commit(&self, commit_hash: &str) -> StoreResult<Option<CommitRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, commit_hash, timestamp, repo_path, commit_message, author_name, author_email, branch_name, files_changed, created_at
                 FROM commits
                 WHERE commit_hash = ?1",
                params![commit_hash],
                Self::row_to_commit,
            )
            .optional()?;
        Ok(record)
    }

    fn row_to_commit(row: &rusqlite::Row) -> rusqlite::Result<CommitRecord> {
        Ok(CommitRecord {
            id: row.get(0)?,
            metadata: CommitMetadata {
                commit_hash: row.get(1)?,
                timestamp: row.get(2)?,
                repo_path: row.get(3)?,
                commit_message: row.get(4)?,
                author_name: row.get(5)?,
                author_email: row.get(6)?,
                branch_name: row.get(7)?,
                files_changed: row.get(8)?,
            },
            created_at: row.get(9)?,
        })
    }

    // ==================== Stats ====================

    /// Get total commit count
    pub fn commit_count(&self) -> StoreResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use tempfile::tempdir;

    /// Creates a test database in a temporary directory.
    /// Returns the Database instance and the temp directory (which must be kept alive).
    fn create_test_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().expect("Failed to create temp directory");
        let db_path = dir.path().join("test.db");
        let db = Database::open(&db_path).expect("Failed to open test database");
        (db, dir)
    }

    fn create_test_commit(hash: &str, branch: Option<&str>, files_changed: u32) -> CommitMetadata {
        CommitMetadata {
            commit_hash: hash.to_string(),
            timestamp: 1_700_000_000,
            repo_path: "/home/jane/projects/r".to_string(),
            commit_message: "Fix the frobnicator\n\nLonger explanation.".to_string(),
            author_name: "Jane".to_string(),
            author_email: "jane@x.com".to_string(),
            branch_name: branch.map(|b| b.to_string()),
            files_changed,
        }
    }

    fn now_epoch() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_secs() as i64
    }

    #[test]
    fn test_insert_and_get_commit() {
        let (db, _dir) = create_test_db();
        let commit = create_test_commit("9f8e7d6c5b4a39281706f5e4d3c2b1a098765432", Some("main"), 3);

        let before = now_epoch();
        let outcome = db.insert_commit(&commit).expect("Failed to insert commit");
        let after = now_epoch();
        assert_eq!(outcome, InsertOutcome::Inserted);

        let record = db
            .get_commit(&commit.commit_hash)
            .expect("Failed to get commit")
            .expect("Commit should exist");

        assert_eq!(record.metadata, commit, "Stored fields should match");
        assert!(record.id > 0, "Store should assign an id");
        assert!(
            record.created_at >= before && record.created_at <= after,
            "created_at should be the insertion time"
        );
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (db, _dir) = create_test_db();
        let commit = create_test_commit("aaaa", Some("main"), 1);

        assert_eq!(db.insert_commit(&commit).unwrap(), InsertOutcome::Inserted);

        let mut changed = commit.clone();
        changed.commit_message = "Different message".to_string();
        assert_eq!(
            db.insert_commit(&changed).unwrap(),
            InsertOutcome::AlreadyPresent
        );

        assert_eq!(db.commit_count().unwrap(), 1, "Duplicate must not add a row");
        let stored = db.get_commit("aaaa").unwrap().unwrap();
        assert_eq!(
            stored.metadata.commit_message, commit.commit_message,
            "Existing row must not be modified"
        );
    }

    #[test]
    fn test_detached_branch_is_stored_as_null() {
        let (db, _dir) = create_test_db();
        let commit = create_test_commit("bbbb", None, 0);
        db.insert_commit(&commit).unwrap();

        let stored = db.get_commit("bbbb").unwrap().unwrap();
        assert_eq!(stored.metadata.branch_name, None);
        assert_eq!(stored.metadata.files_changed, 0);
    }

    #[test]
    fn test_delete_commit_reports_removal() {
        let (db, _dir) = create_test_db();
        db.insert_commit(&create_test_commit("cccc", Some("main"), 2))
            .unwrap();

        assert!(db.delete_commit("cccc").unwrap(), "First delete removes the row");
        assert!(
            !db.delete_commit("cccc").unwrap(),
            "Second delete finds nothing"
        );
        assert_eq!(db.commit_count().unwrap(), 0);
    }

    #[test]
    fn test_delete_requires_exact_hash() {
        let (db, _dir) = create_test_db();
        db.insert_commit(&create_test_commit("abc123def456", Some("main"), 2))
            .unwrap();

        assert!(!db.delete_commit("abc123").unwrap(), "Prefixes do not match");
        assert_eq!(db.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let (db, _dir) = create_test_db();
        db.insert_commit(&create_test_commit("one", None, 0)).unwrap();
        db.insert_commit(&create_test_commit("two", None, 0)).unwrap();
        let second_id = db.get_commit("two").unwrap().unwrap().id;

        db.delete_commit("two").unwrap();
        db.insert_commit(&create_test_commit("three", None, 0)).unwrap();

        let third_id = db.get_commit("three").unwrap().unwrap().id;
        assert!(third_id > second_id, "AUTOINCREMENT ids must keep growing");
    }

    // ==================== Database Tests ====================

    #[test]
    fn test_database_creation_with_missing_parents() {
        let dir = tempdir().expect("Failed to create temp directory");
        let db_path = dir.path().join("nested").join("deeper").join("log.sqlite");

        assert!(!db_path.exists());

        let db = Database::open(&db_path).expect("Failed to create database");

        assert!(db_path.exists(), "Database file should exist after creation");
        assert_eq!(db.commit_count().unwrap(), 0);
    }

    #[test]
    fn test_ensure_schema_keeps_existing_rows() {
        let (db, dir) = create_test_db();
        db.insert_commit(&create_test_commit("dddd", Some("dev"), 4))
            .unwrap();
        db.ensure_schema().expect("Second schema pass should succeed");
        drop(db);

        let reopened = Database::open(&dir.path().join("test.db")).unwrap();
        assert_eq!(reopened.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_schema_has_indexes() {
        let (db, _dir) = create_test_db();
        let mut stmt = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'commits'")
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for expected in [
            "idx_repo_path",
            "idx_timestamp",
            "idx_author_email",
            "idx_branch_name",
            "idx_created_at",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_open_existing_does_not_create_file() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("missing").join("log.sqlite");

        let db = Database::open_existing(&db_path).expect("Missing file is not an error");

        assert!(db.is_none());
        assert!(!db_path.exists(), "No file should be created");
        assert!(!db_path.parent().unwrap().exists(), "No directory should be created");
    }

    #[test]
    fn test_open_existing_reads_previous_rows() {
        let (db, dir) = create_test_db();
        db.insert_commit(&create_test_commit("eeee", Some("main"), 1))
            .unwrap();
        drop(db);

        let db = Database::open_existing(&dir.path().join("test.db"))
            .unwrap()
            .expect("File exists");
        assert!(db.get_commit("eeee").unwrap().is_some());
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = Database::open(&blocker.join("log.sqlite"))
            .err()
            .expect("Opening beneath a file should fail");
        assert!(matches!(err, StoreError::CreateDir { .. }));
        assert!(err.to_string().starts_with("Database error"));
    }
}
