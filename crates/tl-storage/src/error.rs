//! Conversion of SQLite errors into threadline errors

use tl_core::error::{Result, ThreadlineError};

/// Attach context to `rusqlite` results
pub(crate) trait DbResultExt<T> {
    fn db_context(self, context: &str) -> Result<T>;
}

impl<T> DbResultExt<T> for rusqlite::Result<T> {
    fn db_context(self, context: &str) -> Result<T> {
        self.map_err(|e| ThreadlineError::Database(e.to_string()).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_context() {
        let result: rusqlite::Result<()> = Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to load comment").unwrap_err();

        assert!(err.to_string().starts_with("Failed to load comment: Database error"));
        assert!(!err.is_fatal());
    }
}
