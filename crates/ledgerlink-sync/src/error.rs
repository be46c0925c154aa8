//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │     Storefront          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Remote         │  │  Storefront             │ │
//! │  │  InvalidUrl     │  │  Decode         │  │  NotFound               │ │
//! │  │  ConfigLoad/Save│  │  HttpClient     │  │  Validation             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Database     │  │    Engine       │                              │
//! │  │                 │  │                 │                              │
//! │  │  DatabaseError  │  │  AlreadyRunning │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
///
/// ## Design Principles
/// - Remote failures carry the raw ERP body for the error report
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid bridge configuration.
    #[error("Invalid bridge configuration: {0}")]
    InvalidConfig(String),

    /// Invalid ERP URL.
    #[error("Invalid ERP URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The ERP answered with a failure (or the transport failed, status 0).
    #[error("ERP request to {resource} failed with status {status}")]
    Remote {
        resource: String,
        status: u16,
        body: String,
    },

    /// The ERP answered successfully but the body could not be decoded.
    #[error("Failed to decode ERP response: {0}")]
    Decode(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    // =========================================================================
    // Storefront / Database Errors
    // =========================================================================
    /// Database query failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A storefront collaborator failed.
    #[error("Storefront error: {0}")]
    Storefront(String),

    /// Entity not found in the storefront.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payload could not be serialized.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// Another invocation of the same sync type is in progress.
    #[error("{0} is already running")]
    AlreadyRunning(String),
}

impl SyncError {
    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        SyncError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ledgerlink_db::DbError> for SyncError {
    fn from(err: ledgerlink_db::DbError) -> Self {
        match err {
            ledgerlink_db::DbError::NotFound { entity, id } => SyncError::NotFound { entity, id },
            other => SyncError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ledgerlink_core::CoreError> for SyncError {
    fn from(err: ledgerlink_core::CoreError) -> Self {
        use ledgerlink_core::CoreError;
        match &err {
            CoreError::Decode { .. } => SyncError::Decode(err.to_string()),
            CoreError::Validation(v) => SyncError::Validation(v.to_string()),
        }
    }
}

impl From<ledgerlink_core::ValidationError> for SyncError {
    fn from(err: ledgerlink_core::ValidationError) -> Self {
        SyncError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::HttpClient(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if the ERP rejected the call or its answer was unreadable.
    ///
    /// Scheduled runs log these and carry on; admin runs show them.
    pub fn is_remote(&self) -> bool {
        matches!(self, SyncError::Remote { .. } | SyncError::Decode(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
                | SyncError::HttpClient(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_errors() {
        let err = SyncError::Remote {
            resource: "LOGPART".into(),
            status: 500,
            body: "boom".into(),
        };
        assert!(err.is_remote());
        assert!(err.to_string().contains("LOGPART"));
        assert!(SyncError::Decode("bad json".into()).is_remote());

        assert!(!SyncError::AlreadyRunning("sync_items_priority".into()).is_remote());
        assert!(!SyncError::InvalidConfig("x".into()).is_remote());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidUrl("nope".into()).is_config_error());
        assert!(SyncError::ConfigLoadFailed("missing".into()).is_config_error());
        assert!(!SyncError::not_found("User", 7).is_config_error());
    }

    #[test]
    fn test_db_not_found_keeps_entity() {
        let err: SyncError = ledgerlink_db::DbError::not_found("Order", 12).into();
        match err {
            SyncError::NotFound { entity, id } => {
                assert_eq!(entity, "Order");
                assert_eq!(id, "12");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_core_errors_keep_their_category() {
        let decode: SyncError = ledgerlink_core::CoreError::decode("PRICELIST", "eof").into();
        assert!(matches!(decode, SyncError::Decode(_)));
        assert!(decode.is_remote());

        let invalid: SyncError = ledgerlink_core::CoreError::from(
            ledgerlink_core::ValidationError::Required { field: "sku".into() },
        )
        .into();
        match invalid {
            SyncError::Validation(message) => assert_eq!(message, "sku is required"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
