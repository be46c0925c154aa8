//! # Price List Rules
//!
//! How an assigned price list changes what a shopper sees.
//!
//! ## Selection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper                     Stored preference     Selection            │
//! │  ─────────                   ─────────────────     ─────────────        │
//! │  anonymous                   (none)            →   Unrestricted         │
//! │  registered                  absent / empty    →   Assigned("בסיס")     │
//! │  registered                  "no-selected"     →   Unrestricted         │
//! │  registered                  "VIP"             →   Assigned("VIP")      │
//! │                                                                         │
//! │  Unrestricted: own prices, full catalog.                                │
//! │  Assigned:     entry price where the SKU is listed, catalog limited     │
//! │                to listed SKUs (NoProducts when none match).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::{BASE_PRICE_LIST_CODE, NO_PRICE_LIST_SENTINEL};

// =============================================================================
// Price List Entry
// =============================================================================

/// One (SKU, price list) price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub product_sku: String,
    pub price_list_code: String,
    pub price_list_name: String,
    /// Currency exactly as the ERP spelled it.
    pub currency: String,
    pub price: Money,
    pub tenant_id: String,
}

/// Distinct price list, for assignment pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListSummary {
    pub code: String,
    pub name: String,
}

// =============================================================================
// Selection
// =============================================================================

/// Which price list governs a shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "code", rename_all = "snake_case")]
pub enum PriceListSelection {
    /// Standard pricing, full catalog.
    Unrestricted,
    /// Prices and visibility follow this list code.
    Assigned(String),
}

impl PriceListSelection {
    /// Selection for a registered shopper from their stored preference.
    ///
    /// ## Example
    /// ```rust
    /// use ledgerlink_core::pricing::PriceListSelection;
    ///
    /// assert_eq!(
    ///     PriceListSelection::from_preference(None),
    ///     PriceListSelection::Assigned("בסיס".into())
    /// );
    /// assert_eq!(
    ///     PriceListSelection::from_preference(Some("no-selected")),
    ///     PriceListSelection::Unrestricted
    /// );
    /// ```
    pub fn from_preference(stored: Option<&str>) -> Self {
        match stored.map(str::trim) {
            None | Some("") => PriceListSelection::Assigned(BASE_PRICE_LIST_CODE.to_string()),
            Some(NO_PRICE_LIST_SENTINEL) => PriceListSelection::Unrestricted,
            Some(code) => PriceListSelection::Assigned(code.to_string()),
        }
    }

    /// Assigned list code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            PriceListSelection::Unrestricted => None,
            PriceListSelection::Assigned(code) => Some(code),
        }
    }
}

// =============================================================================
// Catalog Filter
// =============================================================================

/// Catalog visibility for a shopper.
///
/// `NoProducts` is distinct from both `Unfiltered` and a non-empty id set:
/// a shopper whose list matches nothing sees an empty catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "ids", rename_all = "snake_case")]
pub enum CatalogFilter {
    Unfiltered,
    NoProducts,
    Only(Vec<i64>),
}

impl CatalogFilter {
    /// Filter for the product ids matched by a list.
    pub fn from_ids(mut ids: Vec<i64>) -> Self {
        if ids.is_empty() {
            return CatalogFilter::NoProducts;
        }
        ids.sort_unstable();
        ids.dedup();
        CatalogFilter::Only(ids)
    }

    /// Whether a product id passes the filter.
    pub fn allows(&self, product_id: i64) -> bool {
        match self {
            CatalogFilter::Unfiltered => true,
            CatalogFilter::NoProducts => false,
            CatalogFilter::Only(ids) => ids.binary_search(&product_id).is_ok(),
        }
    }
}

// =============================================================================
// Prices
// =============================================================================

/// Entry price when the SKU is listed, otherwise the product's own price.
pub fn override_price(own_price: Money, entry: Option<&PriceListEntry>) -> Money {
    entry.map(|e| e.price).unwrap_or(own_price)
}

/// Min/max span of a variable product's listed variation prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

impl PriceRange {
    /// Span of the given prices; `None` when there are none.
    pub fn from_prices(prices: impl IntoIterator<Item = Money>) -> Option<Self> {
        prices.into_iter().fold(None, |range, price| {
            Some(match range {
                None => PriceRange { min: price, max: price },
                Some(PriceRange { min, max }) => PriceRange {
                    min: min.min(price),
                    max: max.max(price),
                },
            })
        })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

// =============================================================================
// Currency
// =============================================================================

/// Normalizes an ERP currency code for the storefront.
///
/// ## Example
/// ```rust
/// use ledgerlink_core::pricing::normalize_currency;
///
/// assert_eq!(normalize_currency("$"), "USD");
/// assert_eq!(normalize_currency("ש\"ח"), "ILS");
/// assert_eq!(normalize_currency("שח"), "ILS");
/// assert_eq!(normalize_currency("EUR"), "EUR");
/// ```
pub fn normalize_currency(code: &str) -> String {
    match code {
        "$" => "USD".to_string(),
        "ש\"ח" | "שח" => "ILS".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sku: &str, cents: i64) -> PriceListEntry {
        PriceListEntry {
            product_sku: sku.into(),
            price_list_code: "VIP".into(),
            price_list_name: "VIP".into(),
            currency: "$".into(),
            price: Money::from_cents(cents),
            tenant_id: crate::DEFAULT_TENANT_ID.into(),
        }
    }

    #[test]
    fn test_selection_from_preference() {
        assert_eq!(
            PriceListSelection::from_preference(Some("")),
            PriceListSelection::Assigned(BASE_PRICE_LIST_CODE.into())
        );
        assert_eq!(
            PriceListSelection::from_preference(Some("VIP")),
            PriceListSelection::Assigned("VIP".into())
        );
        assert_eq!(PriceListSelection::Unrestricted.code(), None);
    }

    #[test]
    fn test_catalog_filter_from_ids() {
        assert_eq!(CatalogFilter::from_ids(vec![]), CatalogFilter::NoProducts);
        assert_eq!(
            CatalogFilter::from_ids(vec![3, 1, 3]),
            CatalogFilter::Only(vec![1, 3])
        );
    }

    #[test]
    fn test_catalog_filter_allows() {
        assert!(CatalogFilter::Unfiltered.allows(99));
        assert!(!CatalogFilter::NoProducts.allows(99));
        let only = CatalogFilter::from_ids(vec![5, 7]);
        assert!(only.allows(7));
        assert!(!only.allows(6));
    }

    #[test]
    fn test_override_price() {
        let own = Money::from_cents(12000);
        assert_eq!(override_price(own, Some(&entry("A1", 10000))).cents(), 10000);
        assert_eq!(override_price(own, None), own);
    }

    #[test]
    fn test_price_range() {
        assert!(PriceRange::from_prices(Vec::new()).is_none());

        let range = PriceRange::from_prices(vec![
            Money::from_cents(3000),
            Money::from_cents(1500),
            Money::from_cents(4500),
        ])
        .unwrap();
        assert_eq!(range.min.cents(), 1500);
        assert_eq!(range.max.cents(), 4500);
        assert_eq!(range.to_string(), "15.00 - 45.00");
    }

    #[test]
    fn test_currency_passthrough() {
        assert_eq!(normalize_currency(""), "");
        assert_eq!(normalize_currency("usd"), "usd");
    }
}
