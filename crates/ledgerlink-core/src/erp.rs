//! # ERP Wire Rows
//!
//! Rows of the ERP's OData feeds, decoded exactly as they arrive.
//!
//! ## Feed Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET LOGPART?$expand=PARTUNSPECS_SUBFORM                                │
//! │                                                                         │
//! │  {                                                                      │
//! │    "value": [                                                           │
//! │      { "PARTNAME": "TS-RED-M", "PARTDES": "T-Shirt Red M",             │
//! │        "BASEPLPRICE": 49.9, "INVFLAG": "Y",                            │
//! │        "MPARTNAME": "TS", "MPARTDES": "T-Shirt",                        │
//! │        "PARTUNSPECS_SUBFORM": [                                        │
//! │          { "SPECNAME": "Color", "VALUE": "Red" },                      │
//! │          { "SPECNAME": "Size",  "VALUE": "M" } ] },                    │
//! │      ...                                                                │
//! │    ]                                                                    │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every optional column may be absent or `null`; accessors below apply
//! the defaults the sync operations rely on.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::PriceListEntry;
use crate::types::{AttributeValue, ItemUpsert, StockLevel};
use crate::EXCLUDED_SPEC_NAME;

// =============================================================================
// Feed Envelope
// =============================================================================

/// OData collection envelope (`{"value": [...]}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErpFeed<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

impl<T: serde::de::DeserializeOwned> ErpFeed<T> {
    /// Decodes a raw response body.
    ///
    /// ## Example
    /// ```rust
    /// use ledgerlink_core::erp::{ErpFeed, ErpItem};
    ///
    /// let feed = ErpFeed::<ErpItem>::decode("LOGPART", r#"{"value":[{"PARTNAME":"A1"}]}"#).unwrap();
    /// assert_eq!(feed.value[0].sku(), "A1");
    /// assert!(ErpFeed::<ErpItem>::decode("LOGPART", "<html>").is_err());
    /// ```
    pub fn decode(resource: &str, raw_body: &str) -> CoreResult<Self> {
        serde_json::from_str(raw_body).map_err(|e| CoreError::decode(resource, e))
    }
}

// =============================================================================
// Items (LOGPART)
// =============================================================================

/// One row of the ERP item feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpItem {
    /// Unique SKU. `null` decodes to `None` so one bad row cannot sink the
    /// feed; see [`ErpItem::sku`].
    #[serde(rename = "PARTNAME", default)]
    pub part_name: Option<String>,

    /// Description, used as the storefront title.
    #[serde(rename = "PARTDES", default)]
    pub description: Option<String>,

    /// Base price list price.
    #[serde(rename = "BASEPLPRICE", default)]
    pub base_price: Option<f64>,

    /// Inventory flag, `Y` means the storefront manages stock.
    #[serde(rename = "INVFLAG", default)]
    pub inventory_flag: Option<String>,

    /// Master part number (variation parent).
    #[serde(rename = "MPARTNAME", default)]
    pub master_part_name: Option<String>,

    /// Master part description.
    #[serde(rename = "MPARTDES", default)]
    pub master_description: Option<String>,

    /// Active flag, `Y` = active.
    #[serde(rename = "ROYY_ISUDATE", default)]
    pub active_flag: Option<String>,

    #[serde(rename = "PARTUNSPECS_SUBFORM", default)]
    pub specs: Option<Vec<ErpSpec>>,

    #[serde(rename = "LOGCOUNTERS_SUBFORM", default)]
    pub counters: Option<Vec<ErpCounter>>,

    /// Cross-sell key (title of the related parent group).
    #[serde(rename = "ROYL_SPECDES1", default)]
    pub cross_sell_key: Option<String>,

    #[serde(rename = "ROYL_SPECDES2", default)]
    pub category_spec: Option<String>,

    #[serde(rename = "ROYL_SPECEDES1", default)]
    pub tag_spec_1: Option<String>,

    #[serde(rename = "ROYL_SPECEDES2", default)]
    pub tag_spec_2: Option<String>,

    #[serde(rename = "FAMILYDES", default)]
    pub family: Option<String>,
}

/// Spec (attribute) pair from `PARTUNSPECS_SUBFORM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpSpec {
    #[serde(rename = "SPECNAME")]
    pub name: String,
    #[serde(rename = "VALUE", default)]
    pub value: Option<String>,
}

/// Warehouse counter from `LOGCOUNTERS_SUBFORM`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpCounter {
    /// Available balance; `None` counts as no counter.
    #[serde(rename = "DIFF", default)]
    pub diff: Option<f64>,
}

impl ErpItem {
    /// SKU, empty when `PARTNAME` was absent or `null`.
    pub fn sku(&self) -> &str {
        self.part_name.as_deref().unwrap_or("")
    }

    /// Title for the storefront (empty when the ERP sent none).
    pub fn title(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// `INVFLAG == "Y"`; every other value, including absent, is "no".
    pub fn manages_stock(&self) -> bool {
        self.inventory_flag.as_deref() == Some("Y")
    }

    /// Active unless the active flag is present and not `Y`.
    pub fn is_active(&self) -> bool {
        match self.active_flag.as_deref() {
            Some(flag) => flag == "Y",
            None => true,
        }
    }

    /// Master part number when this row is a variation child.
    ///
    /// Empty strings and the `-` placeholder mean "no master".
    pub fn master_part(&self) -> Option<&str> {
        match self.master_part_name.as_deref() {
            Some("") | Some("-") | None => None,
            Some(master) => Some(master),
        }
    }

    /// Spec attributes except `Material`, in feed order.
    ///
    /// A repeated spec name keeps its last value.
    pub fn spec_attributes(&self) -> Vec<AttributeValue> {
        let mut attributes: Vec<AttributeValue> = Vec::new();
        for spec in self.specs.iter().flatten() {
            if spec.name == EXCLUDED_SPEC_NAME {
                continue;
            }
            let value = spec.value.clone().unwrap_or_default();
            match attributes.iter_mut().find(|a| a.name == spec.name) {
                Some(existing) => existing.value = value,
                None => attributes.push(AttributeValue::new(spec.name.clone(), value)),
            }
        }
        attributes
    }

    /// Stock from the first counter, `None` when the row has no counter or
    /// the first counter carries no balance.
    pub fn first_counter_stock(&self) -> Option<StockLevel> {
        self.counters
            .as_ref()
            .and_then(|counters| counters.first())
            .and_then(|counter| counter.diff)
            .filter(|diff| diff.is_finite())
            .map(|diff| StockLevel::from_quantity(diff.trunc() as i64))
    }

    /// Category names carried on the row.
    pub fn categories(&self) -> Vec<String> {
        non_empty(&[&self.category_spec, &self.family])
    }

    /// Tag names carried on the row.
    pub fn tags(&self) -> Vec<String> {
        non_empty(&[&self.tag_spec_1, &self.tag_spec_2, &self.family])
    }

    /// Simple-product upsert for this row.
    ///
    /// `BASEPLPRICE` becomes both the regular and the effective price.
    pub fn to_upsert(&self) -> ItemUpsert {
        ItemUpsert {
            sku: self.sku().to_string(),
            title: self.title().to_string(),
            price: Money::from_decimal(self.base_price.unwrap_or(0.0)),
            manage_stock: self.manages_stock(),
        }
    }

    /// Cross-sell key, `None` when absent or blank.
    pub fn cross_sell(&self) -> Option<&str> {
        self.cross_sell_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

fn non_empty(fields: &[&Option<String>]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Price Lists (PRICELIST)
// =============================================================================

/// One price list with its per-part prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpPriceList {
    /// Price list code.
    #[serde(rename = "PLNAME")]
    pub code: String,

    /// Price list display name.
    #[serde(rename = "PLDES", default)]
    pub name: Option<String>,

    /// Currency code as the ERP spells it (`$`, `ש"ח`, `EUR`).
    #[serde(rename = "CODE", default)]
    pub currency: Option<String>,

    #[serde(rename = "PARTPRICE2_SUBFORM", default)]
    pub prices: Option<Vec<ErpPartPrice>>,

    /// Customers attached in the ERP (decoded, not used for assignment).
    #[serde(rename = "PLISTCUSTOMERS_SUBFORM", default)]
    pub customers: Option<Vec<serde_json::Value>>,
}

impl ErpPriceList {
    /// One table row per part price, stamped with the tenant.
    ///
    /// Rows without a part number or without a price are left out.
    pub fn entries(&self, tenant_id: &str) -> Vec<PriceListEntry> {
        self.prices
            .iter()
            .flatten()
            .filter_map(|part| {
                let sku = part.part_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                let price = part.price?;
                Some(PriceListEntry {
                    product_sku: sku.to_string(),
                    price_list_code: self.code.clone(),
                    price_list_name: self.name.clone().unwrap_or_default(),
                    currency: self.currency.clone().unwrap_or_default(),
                    price: Money::from_decimal(price),
                    tenant_id: tenant_id.to_string(),
                })
            })
            .collect()
    }
}

/// Price of one part in a price list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErpPartPrice {
    #[serde(rename = "PARTNAME", default)]
    pub part_name: Option<String>,
    #[serde(rename = "PRICE", default)]
    pub price: Option<f64>,
}

// =============================================================================
// Unit Tests
// =============================================================================
