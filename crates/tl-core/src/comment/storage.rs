//! Comment storage trait

use super::model::Comment;
use crate::age::RelativeAge;
use crate::error::Result;
use crate::thread::{Thread, ThreadBuilder};
use crate::types::{CommentId, PostId};

/// Trait for comment storage implementations
pub trait CommentStorage {
    /// Check if the backing table is missing
    fn is_empty(&self) -> Result<bool>;

    /// Create the backing table if it does not exist
    fn create_schema(&self) -> Result<()>;

    /// Number of stored comments
    fn count(&self) -> Result<u64>;

    /// Store a new comment, returning it with its assigned id and timestamp
    fn add(&self, comment: &Comment) -> Result<Comment>;

    /// Remove a comment by id, returning whether it existed
    fn remove_by_id(&self, id: CommentId) -> Result<bool>;

    /// Remove all comments by a user, returning how many were removed
    fn remove_by_username(&self, username: &str) -> Result<usize>;

    /// Remove comments stamped at or after `now - age`
    fn remove_newer_than(&self, age: &RelativeAge) -> Result<usize>;

    /// Remove comments stamped at or before `now - age`
    fn remove_older_than(&self, age: &RelativeAge) -> Result<usize>;

    /// Set or clear the soft-delete flag, returning whether the comment exists
    fn set_deleted(&self, id: CommentId, deleted: bool) -> Result<bool>;

    /// Set or clear the hidden flag, returning whether the comment exists
    fn set_hidden(&self, id: CommentId, hidden: bool) -> Result<bool>;

    /// Get a comment by id
    fn fetch_by_id(&self, id: CommentId) -> Result<Option<Comment>>;

    /// Get up to `limit` comments of a post, oldest first
    fn fetch_by_post(&self, post_id: PostId, limit: usize) -> Result<Vec<Comment>>;

    /// Builder used by `fetch_thread`
    fn thread_builder(&self) -> ThreadBuilder {
        ThreadBuilder::default()
    }

    /// Get the comments of a post arranged as a reply tree
    fn fetch_thread(&self, post_id: PostId, limit: usize) -> Result<Thread> {
        let comments = self.fetch_by_post(post_id, limit)?;
        Ok(self.thread_builder().build(&comments))
    }
}
