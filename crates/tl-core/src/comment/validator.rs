//! Comment validation

use super::model::Comment;
use crate::config::ValidationConfig;
use crate::error::{Result, ThreadlineError};

/// Validator for comments about to be stored
pub struct CommentValidator {
    max_username_length: usize,
    max_ip_length: usize,
    max_message_length: usize,
}

impl CommentValidator {
    /// Create a new validator with default settings
    pub fn new() -> Self {
        Self::from_config(&ValidationConfig::default())
    }

    /// Create a validator from configured limits
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            max_username_length: config.max_username_length,
            max_ip_length: config.max_ip_length,
            max_message_length: config.max_message_length,
        }
    }

    /// Validate the comment body
    pub fn validate_message(&self, message: &str) -> Result<()> {
        let trimmed = message.trim();

        if trimmed.is_empty() {
            return Err(ThreadlineError::Validation(
                "Comment message cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > self.max_message_length {
            return Err(ThreadlineError::Validation(format!(
                "Comment message exceeds maximum length of {} characters",
                self.max_message_length
            )));
        }

        Ok(())
    }

    /// Validate a comment before insertion
    pub fn validate(&self, comment: &Comment) -> Result<()> {
        if let Some(id) = comment.id() {
            return Err(ThreadlineError::Validation(format!(
                "Comment {} is already stored",
                id
            )));
        }

        if comment.post_id().get() <= 0 {
            return Err(ThreadlineError::Validation(format!(
                "Invalid post id {}",
                comment.post_id()
            )));
        }

        if comment.parent_id().get() < 0 {
            return Err(ThreadlineError::Validation(format!(
                "Invalid parent id {}",
                comment.parent_id()
            )));
        }

        self.validate_message(comment.message())?;

        if let Some(username) = comment.username() {
            if username.chars().count() > self.max_username_length {
                return Err(ThreadlineError::Validation(format!(
                    "Username exceeds maximum length of {} characters",
                    self.max_username_length
                )));
            }
        }

        if let Some(ip) = comment.ip() {
            if ip.chars().count() > self.max_ip_length {
                return Err(ThreadlineError::Validation(format!(
                    "IP address exceeds maximum length of {} characters",
                    self.max_ip_length
                )));
            }
        }

        Ok(())
    }
}

impl Default for CommentValidator {
    fn default() -> Self {
        Self::new()
    }
}
