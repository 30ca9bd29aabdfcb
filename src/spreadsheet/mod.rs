//! # Spreadsheet Tab Module
//!
//! Everything that deals with a single tab of a warehouse spreadsheet: deciding
//! what kind of data a tab holds from its name, decoding the backend's JSON
//! payload, and normalizing it into a header-keyed table.
use thiserror::Error;

pub mod category;
pub mod criteria;
pub mod payload;
pub mod table;

/// Errors raised while decoding or interpreting tab data.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// The backend answered with an error envelope
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    /// The backend answered with JSON of an unexpected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Malformed payload: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid sheet category '{0}'")]
    CategoryError(String),

    #[error("Invalid month '{0}', expected 1-12")]
    MonthError(u32),
}
