use thiserror::Error;

/// Main error type of the crate.
/// Aggregates errors from dependencies and the internal modules.
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("{0}")]
    WithContextError(String),

    #[error("{0}")]
    AnyhowError(#[from] anyhow::Error),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Session module errors
    #[error("{0}")]
    SessionError(#[from] crate::session::SessionError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, AttendanceError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| AttendanceError::WithContextError(format!("{}: {}", message, e)))
    }
}
