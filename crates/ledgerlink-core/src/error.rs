//! # Core Errors
//!
//! ```text
//! ValidationError ──► CoreError::Validation ──┐
//! serde_json      ──► CoreError::Decode     ──┴──► SyncError (ledgerlink-sync)
//! ```
//!
//! Mapping itself never fails: missing optional ERP or storefront data falls
//! back to documented defaults. Only undecodable feeds and rejected input
//! surface as errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The ERP body is not the feed we asked for (an HTML login page, a row
    /// without `PARTNAME`, ...).
    #[error("Failed to decode {resource} feed: {reason}")]
    Decode { resource: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn decode(resource: impl Into<String>, reason: impl ToString) -> Self {
        CoreError::Decode {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

/// Rejected admin or hook input.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;
