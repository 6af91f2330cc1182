//! Comment builder for fluent API

use super::model::Comment;
use crate::error::{Result, ThreadlineError};
use crate::types::{CommentId, PostId};

/// Builder for creating comments with fluent API
pub struct CommentBuilder {
    post_id: PostId,
    parent_id: CommentId,
    username: Option<String>,
    message: Option<String>,
    ip: Option<String>,
}

impl CommentBuilder {
    /// Create a new builder for a top-level comment on a post
    pub fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            parent_id: CommentId::ROOT,
            username: None,
            message: None,
            ip: None,
        }
    }

    /// Make the comment a reply
    pub fn reply_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the commenter name
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the comment body
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the originating address
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Build the comment
    pub fn build(self) -> Result<Comment> {
        let message = self.message.ok_or_else(|| {
            ThreadlineError::Validation("Comment message is required".to_string())
        })?;

        if message.trim().is_empty() {
            return Err(ThreadlineError::Validation(
                "Comment message cannot be empty".to_string(),
            ));
        }

        if self.post_id.get() <= 0 {
            return Err(ThreadlineError::Validation(format!(
                "Invalid post id {}",
                self.post_id
            )));
        }

        let mut comment = Comment::new(self.post_id);
        comment.set_parent_id(self.parent_id);
        comment.set_message(message);
        if let Some(username) = self.username {
            comment.set_username(username);
        }
        if let Some(ip) = self.ip {
            comment.set_ip(ip);
        }

        Ok(comment)
    }

    /// Build the comment and sanitize it for storage
    pub fn build_prepared(self) -> Result<Comment> {
        let mut comment = self.build()?;
        comment.prepare();
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_builder() {
        let comment = CommentBuilder::new(PostId(2))
            .username("Ipsum of Lorem")
            .message("First message")
            .ip("10.0.0.1")
            .build()
            .unwrap();

        assert_eq!(comment.post_id(), PostId(2));
        assert!(comment.is_root());
        assert_eq!(comment.username(), Some("Ipsum of Lorem"));
        assert_eq!(comment.ip(), Some("10.0.0.1"));
        assert!(!comment.is_prepared());
    }

    #[test]
    fn test_reply_builder() {
        let comment = CommentBuilder::new(PostId(2))
            .reply_to(CommentId(1))
            .message("Reply to first message")
            .build()
            .unwrap();

        assert_eq!(comment.parent_id(), CommentId(1));
        assert!(!comment.is_root());
    }

    #[test]
    fn test_build_prepared() {
        let comment = CommentBuilder::new(PostId(2))
            .message("<i>hi</i>")
            .build_prepared()
            .unwrap();

        assert!(comment.is_prepared());
        assert_eq!(comment.message(), "&lt;i&gt;hi&lt;/i&gt;");
    }

    #[test]
    fn test_builder_without_message_fails() {
        assert!(CommentBuilder::new(PostId(2)).build().is_err());
    }

    #[test]
    fn test_builder_with_empty_message_fails() {
        assert!(CommentBuilder::new(PostId(2)).message("   ").build().is_err());
    }

    #[test]
    fn test_builder_with_invalid_post_fails() {
        let result = CommentBuilder::new(PostId(0)).message("orphaned").build();
        assert!(matches!(result, Err(ThreadlineError::Validation(_))));
    }
}
