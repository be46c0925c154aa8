//! # Validation Module
//!
//! Input checks applied before anything reaches the ERP.
//!
//! ## Where Checks Run
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Admin request (bulk ids, price list assignment)                       │
//! │  └── THIS MODULE: ids, codes                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Item export                                                           │
//! │  └── THIS MODULE: products without a usable SKU are skipped            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ERP                                                                   │
//! │  └── Rejects anything else with an error body                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::NO_PRICE_LIST_SENTINEL;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest SKU the ERP accepts as `PARTNAME`.
pub const MAX_SKU_LEN: usize = 50;

/// Longest price list code stored on a user.
pub const MAX_PRICE_LIST_CODE_LEN: usize = 64;

/// Validates a SKU for export.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 50 characters
///
/// ## Example
/// ```rust
/// use ledgerlink_core::validation::validate_sku;
///
/// assert!(validate_sku("TS-RED-M").is_ok());
/// assert!(validate_sku("  ").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    Ok(())
}

/// Validates a storefront entity id from an admin request.
pub fn validate_entity_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price list code being assigned to a user.
///
/// The `no-selected` sentinel is accepted.
pub fn validate_price_list_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "price_list_code".to_string(),
        });
    }

    if code == NO_PRICE_LIST_SENTINEL {
        return Ok(());
    }

    if code.chars().count() > MAX_PRICE_LIST_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "price_list_code".to_string(),
            max: MAX_PRICE_LIST_CODE_LEN,
        });
    }

    Ok(())
}

/// Validates a notification recipient address.
pub fn validate_recipient(address: &str) -> ValidationResult<()> {
    let address = address.trim();
    match address.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "recipient".to_string(),
            reason: format!("'{}' is not an email address", address),
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
