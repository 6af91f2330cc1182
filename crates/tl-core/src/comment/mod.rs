//! Comment system module
//!
//! Handles the comment record, sanitization, validation and the storage
//! contract.

pub mod model;
pub mod sanitize;
pub mod validator;
pub mod builder;
pub mod storage;

pub use model::*;
pub use sanitize::escape_html;
pub use validator::CommentValidator;
pub use builder::CommentBuilder;
pub use storage::CommentStorage;
