use std::path::PathBuf;

/// Broad classification of an [`ImportError`].
///
/// Callers branch on the kind instead of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document contents are inconsistent or violate a collection rule
    BadData,
    /// The operator asked the job to stop
    Cancelled,
    /// The source document could not be found
    Missing,
    /// Unexpected failure (storage, I/O, parse format)
    System,
}

impl ErrorKind {
    /// Whether the failure should be sent to crash reporting.
    ///
    /// Data-quality failures and cancellations are user-actionable and are
    /// kept out of the system-wide error log.
    pub fn is_reportable(self) -> bool {
        matches!(self, ErrorKind::Missing | ErrorKind::System)
    }
}

/// Errors that can occur while importing a document
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The source document does not exist
    #[error("Input file not found: {}", .0.display())]
    Missing(PathBuf),

    /// Malformed or inconsistent document data
    #[error("{0}")]
    BadData(String),

    /// The import job was cancelled
    #[error("Import cancelled")]
    Cancelled,

    /// Error from the underlying database
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error reading the document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error deserializing the parsed document
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ImportError {
    /// Build a data-quality error from a message.
    pub fn bad_data(message: impl Into<String>) -> Self {
        Self::BadData(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Missing(_) => ErrorKind::Missing,
            ImportError::BadData(_) => ErrorKind::BadData,
            ImportError::Cancelled => ErrorKind::Cancelled,
            ImportError::Database(_)
            | ImportError::Io(_)
            | ImportError::Json(_)
            | ImportError::Parse(_) => ErrorKind::System,
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T, E = ImportError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ImportError::bad_data("dup").kind(), ErrorKind::BadData);
        assert_eq!(ImportError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(
            ImportError::Missing(PathBuf::from("a.sky")).kind(),
            ErrorKind::Missing
        );
        assert_eq!(
            ImportError::Parse("truncated".to_string()).kind(),
            ErrorKind::System
        );
    }

    #[test]
    fn test_reportable() {
        assert!(!ErrorKind::BadData.is_reportable());
        assert!(!ErrorKind::Cancelled.is_reportable());
        assert!(ErrorKind::System.is_reportable());
        assert!(ErrorKind::Missing.is_reportable());
    }

    #[test]
    fn test_bad_data_message_is_verbatim() {
        let err = ImportError::bad_data("Duplicate protein P02768");
        assert_eq!(err.to_string(), "Duplicate protein P02768");
    }
}
