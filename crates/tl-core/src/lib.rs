//! tl-core - Core library for threadline
//!
//! This crate provides the comment record, its sanitization and validation
//! rules, the storage contract, and the thread builder that turns a flat
//! comment list into a reply tree.

pub mod error;
pub mod types;
pub mod config;
pub mod clock;
pub mod age;
pub mod comment;
pub mod thread;

pub use error::{ThreadlineError, Result};
pub use types::*;
pub use age::RelativeAge;
pub use comment::{Comment, CommentBuilder, CommentStorage};
pub use thread::{Thread, ThreadBuilder, ThreadNode};
