//! tl-storage - Storage library for threadline
//!
//! This crate provides the SQLite implementation of the comment store.

mod comment_store;
mod error;

pub use comment_store::{SqliteCommentStore, TABLE_NAME};
