//! SQLite storage for comments

use crate::error::DbResultExt;
use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tl_core::clock::{Clock, SystemClock};
use tl_core::comment::{escape_html, Comment, CommentStorage, CommentValidator};
use tl_core::config::{Config, RetentionConfig};
use tl_core::error::{Result, ThreadlineError};
use tl_core::thread::{Thread, ThreadBuilder};
use tl_core::types::{CommentId, PostId};
use tl_core::RelativeAge;
use tracing::{debug, info, warn};

/// Name of the comments table
pub const TABLE_NAME: &str = "comments";

/// Format of the timestamps written by the store
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_id  INTEGER      NOT NULL DEFAULT 0,
    post_id    INTEGER      NOT NULL,
    username   NVARCHAR(80),
    message    TEXT         NOT NULL,
    timestamp  DATETIME     DEFAULT CURRENT_TIMESTAMP,
    ip         VARCHAR(50),
    is_deleted BOOLEAN      NOT NULL DEFAULT 0,
    is_hidden  BOOLEAN      NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_comments_post
    ON comments(post_id, timestamp, parent_id);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, parent_id, post_id, username, message, timestamp, ip, is_deleted, is_hidden FROM comments";

/// Comment store backed by a single SQLite connection.
///
/// The connection is opened on construction and closed when the store is
/// dropped (or explicitly with [`SqliteCommentStore::close`]).
pub struct SqliteCommentStore {
    conn: Connection,
    /// Database file, `None` for in-memory stores
    path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    validator: CommentValidator,
    thread_builder: ThreadBuilder,
    retention: RetentionConfig,
    default_limit: usize,
}

impl SqliteCommentStore {
    /// Open the database at `path`.
    ///
    /// A missing file is created only when `create_if_missing` is set.
    /// Missing tables are created. Errors from this constructor mean the
    /// store is unusable and are meant to stop the caller.
    pub fn open(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            if !create_if_missing {
                return Err(ThreadlineError::StoreMissing(path));
            }
            warn!("No such database {:?}, creating it", path);
            Self::ensure_parent_dir(&path)?;
        }

        let conn = Connection::open(&path)
            .map_err(|e| ThreadlineError::SchemaCreation(format!("open {:?}: {}", path, e)))?;
        Self::init(conn, Some(path))
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ThreadlineError::SchemaCreation(e.to_string()))?;
        Self::init(conn, None)
    }

    /// Open the database described by a configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Self::open(&config.storage.path, config.storage.create_if_missing)?;
        Ok(store.with_config(config))
    }

    /// Apply validation, thread, retention and fetch settings
    pub fn with_config(mut self, config: &Config) -> Self {
        self.validator = CommentValidator::from_config(&config.validation);
        self.thread_builder = ThreadBuilder::from_config(&config.thread);
        self.retention = config.retention.clone();
        self.default_limit = config.fetch.default_limit;
        self
    }

    /// Use a different time source for stamping and cutoffs
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let defaults = Config::default();
        let store = Self {
            conn,
            path,
            clock: Arc::new(SystemClock),
            validator: CommentValidator::from_config(&defaults.validation),
            thread_builder: ThreadBuilder::from_config(&defaults.thread),
            retention: defaults.retention,
            default_limit: defaults.fetch.default_limit,
        };

        let empty = store
            .is_empty()
            .map_err(|e| ThreadlineError::SchemaCreation(e.to_string()))?;
        if empty {
            store
                .create_schema()
                .map_err(|e| ThreadlineError::SchemaCreation(e.to_string()))?;
        }

        Ok(store)
    }

    fn ensure_parent_dir(path: &Path) -> Result<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                fs::create_dir_all(parent).map_err(|e| {
                    ThreadlineError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to create database directory: {}", e),
                    ))
                })?;
                debug!("Created database directory: {:?}", parent);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Limit used by the `*_default` fetches
    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    /// Comments of a post, up to the configured limit
    pub fn fetch_by_post_default(&self, post_id: PostId) -> Result<Vec<Comment>> {
        self.fetch_by_post(post_id, self.default_limit)
    }

    /// Thread of a post, up to the configured limit
    pub fn fetch_thread_default(&self, post_id: PostId) -> Result<Thread> {
        self.fetch_thread(post_id, self.default_limit)
    }

    /// Remove comments newer than the configured window ("1 day" by default)
    pub fn remove_recent(&self) -> Result<usize> {
        let age = self.retention.newer_than;
        self.remove_newer_than(&age)
    }

    /// Remove comments older than the configured window ("6 months" by default)
    pub fn remove_expired(&self) -> Result<usize> {
        let age = self.retention.older_than;
        self.remove_older_than(&age)
    }

    /// Soft-delete a comment, keeping it in place for its replies
    pub fn soft_delete(&self, id: CommentId) -> Result<bool> {
        self.set_deleted(id, true)
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .db_context("Failed to close database")
    }

    fn update_flag(&self, column: Flag, id: CommentId, value: bool) -> Result<bool> {
        let sql = match column {
            Flag::Deleted => "UPDATE comments SET is_deleted = ?1 WHERE id = ?2",
            Flag::Hidden => "UPDATE comments SET is_hidden = ?1 WHERE id = ?2",
        };
        let changed = self
            .conn
            .execute(sql, params![value, id.get()])
            .db_context("Failed to update comment")?;

        debug!("Set {:?}={} on comment {} ({} rows)", column, value, id, changed);
        Ok(changed > 0)
    }

    /// Timestamps are compared through `julianday` so that rows stamped
    /// with or without fractional seconds, or in ISO `T` form, compare by
    /// instant rather than by text.
    fn remove_by_age(&self, bound: Bound, age: &RelativeAge) -> Result<usize> {
        let cutoff = age.cutoff_from(self.clock.now())?;
        let sql = match bound {
            Bound::Newer => "DELETE FROM comments WHERE julianday(timestamp) >= julianday(?1)",
            Bound::Older => "DELETE FROM comments WHERE julianday(timestamp) <= julianday(?1)",
        };
        let removed = self
            .conn
            .execute(sql, params![format_timestamp(cutoff)])
            .db_context("Failed to remove comments by age")?;

        info!("Removed {} comments {:?} than {}", removed, bound, age);
        Ok(removed)
    }
}

/// Side of the cutoff removed by the age-based removals
#[derive(Debug, Clone, Copy)]
enum Bound {
    Newer,
    Older,
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Deleted,
    Hidden,
}

impl CommentStorage for SqliteCommentStore {
    fn is_empty(&self) -> Result<bool> {
        let tables: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(name) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![TABLE_NAME],
                |row| row.get(0),
            )
            .db_context("Failed to inspect schema")?;
        Ok(tables == 0)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(CREATE_SCHEMA)
            .db_context("Failed to create comments table")?;
        info!("Created table '{}'", TABLE_NAME);
        Ok(())
    }

    fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .db_context("Failed to count comments")?;
        Ok(count as u64)
    }

    fn add(&self, comment: &Comment) -> Result<Comment> {
        self.validator
            .validate(comment)
            .map_err(|e| e.with_context("Failed to add comment"))?;

        if !comment.is_prepared() {
            warn!(
                "Storing comment on post {} that was not prepared",
                comment.post_id()
            );
        }

        let timestamp = self.clock.now().trunc_subsecs(3);
        self.conn
            .execute(
                "INSERT INTO comments
                    (parent_id, post_id, username, message, timestamp, ip, is_deleted, is_hidden)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    comment.parent_id().get(),
                    comment.post_id().get(),
                    comment.username(),
                    comment.message(),
                    format_timestamp(timestamp),
                    comment.ip(),
                    comment.is_deleted(),
                    comment.is_hidden(),
                ],
            )
            .db_context("Failed to add comment")?;

        let id = CommentId(self.conn.last_insert_rowid());
        debug!("Added comment {} to post {}", id, comment.post_id());
        Ok(comment.clone().persisted(id, timestamp))
    }

    fn remove_by_id(&self, id: CommentId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM comments WHERE id = ?1", params![id.get()])
            .db_context("Failed to remove comment")?;

        debug!("Removed comment {} ({} rows)", id, removed);
        Ok(removed > 0)
    }

    /// Matches the name as given and in its prepared (encoded) form.
    fn remove_by_username(&self, username: &str) -> Result<usize> {
        let username = username.trim();
        let removed = self
            .conn
            .execute(
                "DELETE FROM comments WHERE username = ?1 OR username = ?2",
                params![username, escape_html(username)],
            )
            .db_context("Failed to remove comments by username")?;

        info!("Removed {} comments by '{}'", removed, username);
        Ok(removed)
    }

    fn remove_newer_than(&self, age: &RelativeAge) -> Result<usize> {
        self.remove_by_age(Bound::Newer, age)
    }

    fn remove_older_than(&self, age: &RelativeAge) -> Result<usize> {
        self.remove_by_age(Bound::Older, age)
    }

    fn set_deleted(&self, id: CommentId, deleted: bool) -> Result<bool> {
        self.update_flag(Flag::Deleted, id, deleted)
    }

    fn set_hidden(&self, id: CommentId, hidden: bool) -> Result<bool> {
        self.update_flag(Flag::Hidden, id, hidden)
    }

    fn fetch_by_id(&self, id: CommentId) -> Result<Option<Comment>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id.get()],
                map_comment_row,
            )
            .optional()
            .db_context("Failed to fetch comment")
    }

    fn fetch_by_post(&self, post_id: PostId, limit: usize) -> Result<Vec<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "{} WHERE post_id = ?1 ORDER BY julianday(timestamp) ASC, parent_id ASC, id ASC LIMIT ?2",
                SELECT_COLUMNS
            ))
            .db_context("Failed to prepare comment query")?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let comments = stmt
            .query_map(params![post_id.get(), limit], map_comment_row)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .db_context("Failed to fetch comments")?;

        debug!("Fetched {} comments for post {}", comments.len(), post_id);
        Ok(comments)
    }

    fn thread_builder(&self) -> ThreadBuilder {
        self.thread_builder.clone()
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp, with or without fractional seconds
fn parse_timestamp(value: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn map_comment_row(row: &Row) -> rusqlite::Result<Comment> {
    let timestamp = row
        .get::<_, Option<String>>("timestamp")?
        .map(|value| parse_timestamp(&value))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

    let mut comment = Comment::new(PostId(row.get("post_id")?));
    comment.set_parent_id(CommentId(row.get("parent_id")?));
    if let Some(username) = row.get::<_, Option<String>>("username")? {
        comment.set_username(username);
    }
    comment.set_message(row.get::<_, String>("message")?);
    if let Some(ip) = row.get::<_, Option<String>>("ip")? {
        comment.set_ip(ip);
    }
    comment.set_deleted(row.get("is_deleted")?);
    comment.set_hidden(row.get("is_hidden")?);

    let id = CommentId(row.get("id")?);
    if timestamp.is_none() {
        debug!("Comment {} has no timestamp", id);
    }
    Ok(comment.restored(id, timestamp))
}
