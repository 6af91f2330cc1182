//! Error types for threadline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for threadline
#[derive(Debug, Error)]
pub enum ThreadlineError {
    /// Storage engine error
    #[error("Database error: {0}")]
    Database(String),

    /// Backing database file does not exist and may not be created
    #[error("No such database: {}", .0.display())]
    StoreMissing(PathBuf),

    /// The comments table could not be created
    #[error("Could not create comments table: {0}")]
    SchemaCreation(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Relative age that cannot be parsed
    #[error("Invalid relative age: {0}")]
    InvalidAge(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ThreadlineError>,
    },
}

impl ThreadlineError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ThreadlineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this error means the store cannot be used at all
    pub fn is_fatal(&self) -> bool {
        match self {
            ThreadlineError::StoreMissing(_) | ThreadlineError::SchemaCreation(_) => true,
            ThreadlineError::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Result type alias for threadline
pub type Result<T> = std::result::Result<T, ThreadlineError>;
