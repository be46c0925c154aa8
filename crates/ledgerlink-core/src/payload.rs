//! # Outbound ERP Payloads
//!
//! Typed bodies for every write the engine sends to the ERP. Field names
//! are the ERP's own column names, fixed through serde renames, so a
//! payload serializes straight into the request body.
//!
//! ## Order Payload Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST ORDERS                                                            │
//! │                                                                         │
//! │  CUSTNAME  CDES  CURDATE  BOOKNUM              ← header                 │
//! │  SHIPTO2_SUBFORM { NAME PHONENUM ADDRESS ... } ← ship-to block          │
//! │  ORDERITEMS_SUBFORM [                                                   │
//! │     { PARTNAME TQUANT PRICE REMARK1 ROYY_ORDISPECS_SUBFORM[..] }  × n   │
//! │     { PARTNAME "000" PDES <shipping> TQUANT 1 PRICE <ship total> }      │
//! │  ]                                                                      │
//! │  PAYMENTDEF_SUBFORM { PAYMENTCODE QPRICE PAYACCOUNT ... }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::countries::country_name;
use crate::types::{CatalogProduct, Order, OrderLine, ShippingMethod, UserProfile};
use crate::{SHIPPING_LINE_SKU, SPEC_OVERRIDES_META_KEY};

/// Order meta keys written by the card gateway.
pub mod gateway_meta {
    pub const CARD_NUMBER: &str = "_ccnumber";
    pub const TOKEN: &str = "_creditguard_token";
    pub const EXPIRATION: &str = "_creditguard_expiration";
    pub const AUTHORIZATION: &str = "_creditguard_authorization";
    pub const PAYMENTS: &str = "_payments";
    pub const FIRST_PAYMENT: &str = "_first_payment";
    pub const PERIODICAL_PAYMENT: &str = "_periodical_payment";
}

/// ERP branch every customer is filed under.
pub const CUSTOMER_BRANCH: &str = "1";

/// ERP field that receives the line remark.
pub const REMARK_FIELD: &str = "REMARK1";

// =============================================================================
// Mapping Tables
// =============================================================================

/// Storefront identifier → ERP code translation tables.
///
/// ## Example
/// ```rust
/// use ledgerlink_core::payload::MappingTables;
/// use ledgerlink_core::types::ShippingMethod;
///
/// let mut tables = MappingTables::default();
/// tables.shipping.insert("flat_rate_3".into(), "SHIP-FLAT".into());
///
/// let method = ShippingMethod { method_id: "flat_rate:3".into(), title: "Flat rate".into() };
/// assert_eq!(tables.shipping_name(Some(&method)), "SHIP-FLAT");
/// assert_eq!(tables.payment_code("paypal"), "paypal");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingTables {
    /// Shipping method id (`:` replaced by `_`) → ERP shipping description.
    pub shipping: BTreeMap<String, String>,

    /// Payment method id → ERP payment code.
    pub payment: BTreeMap<String, String>,

    /// Order line meta key → ERP line field (e.g. `REMARK1`).
    pub line_parameters: BTreeMap<String, String>,
}

impl MappingTables {
    /// Mapped shipping name, falling back to the method's own label.
    pub fn shipping_name(&self, method: Option<&ShippingMethod>) -> String {
        let Some(method) = method else {
            return String::new();
        };
        let key = method.method_id.replace(':', "_");
        self.shipping
            .get(&key)
            .cloned()
            .unwrap_or_else(|| method.title.clone())
    }

    /// Mapped payment code, falling back to the raw method id.
    pub fn payment_code(&self, method: &str) -> String {
        self.payment
            .get(method)
            .cloned()
            .unwrap_or_else(|| method.to_string())
    }

    /// Line remark from the first meta key mapped to `REMARK1`.
    fn line_remark(&self, line: &OrderLine) -> String {
        line.meta
            .iter()
            .find(|(key, _)| {
                self.line_parameters.get(key.as_str()).map(String::as_str) == Some(REMARK_FIELD)
            })
            .map(|(_, value)| value.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Items
// =============================================================================

/// Body of `POST/PATCH LOGPART` for the item export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    #[serde(rename = "PARTNAME")]
    pub part_name: String,
    #[serde(rename = "PARTDES")]
    pub description: String,
    #[serde(rename = "BASEPLPRICE")]
    pub base_price: f64,
    #[serde(rename = "INVFLAG")]
    pub inventory_flag: String,
}

impl ItemPayload {
    pub fn from_product(product: &CatalogProduct) -> Self {
        ItemPayload {
            part_name: product.sku.clone(),
            description: product.title.clone(),
            base_price: product.regular_price.to_decimal(),
            inventory_flag: if product.manage_stock { "Y" } else { "N" }.to_string(),
        }
    }
}

// =============================================================================
// Customers
// =============================================================================

/// Body of `POST/PATCH CUSTOMERS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPayload {
    #[serde(rename = "CUSTNAME")]
    pub customer_number: String,
    #[serde(rename = "CUSTDES")]
    pub description: String,
    #[serde(rename = "EMAIL")]
    pub email: String,
    #[serde(rename = "BRANCHNAME")]
    pub branch: String,
    #[serde(rename = "ADDRESS")]
    pub address: String,
    #[serde(rename = "ADDRESS2")]
    pub address_2: String,
    #[serde(rename = "STATEA")]
    pub city: String,
    #[serde(rename = "ZIP")]
    pub zip: String,
    #[serde(rename = "COUNTRYNAME")]
    pub country: String,
    #[serde(rename = "PHONE")]
    pub phone: String,
}

impl CustomerPayload {
    /// Builds the customer body for a known customer number.
    ///
    /// `CUSTDES` is `first last` only when both names are present.
    pub fn build(profile: &UserProfile, customer_number: &str) -> Self {
        let description = match (&profile.first_name, &profile.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => String::new(),
        };

        CustomerPayload {
            customer_number: customer_number.to_string(),
            description,
            email: profile.email.clone(),
            branch: CUSTOMER_BRANCH.to_string(),
            address: profile.billing.address_1.clone(),
            address_2: profile.billing.address_2.clone(),
            city: profile.billing.city.clone(),
            zip: profile.billing.postcode.clone(),
            country: country_name(&profile.billing.country).to_string(),
            phone: profile.billing.phone.clone(),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Body of `POST ORDERS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(rename = "CUSTNAME")]
    pub customer_number: String,
    #[serde(rename = "CDES")]
    pub customer_description: String,
    #[serde(rename = "CURDATE")]
    pub date: String,
    #[serde(rename = "BOOKNUM")]
    pub order_number: String,
    #[serde(rename = "SHIPTO2_SUBFORM")]
    pub ship_to: ShipTo,
    #[serde(rename = "ORDERITEMS_SUBFORM")]
    pub items: Vec<OrderItemPayload>,
    #[serde(rename = "PAYMENTDEF_SUBFORM")]
    pub payment: PaymentDefinition,
}

/// Ship-to address block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipTo {
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "PHONENUM")]
    pub phone: String,
    #[serde(rename = "ADDRESS")]
    pub address: String,
    #[serde(rename = "STATE")]
    pub city: String,
    #[serde(rename = "COUNTRYNAME")]
    pub country: String,
    #[serde(rename = "ZIP")]
    pub zip: String,
    /// Only sent when the order has a second address line.
    #[serde(rename = "ADDRESS2", skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
}

/// One `ORDERITEMS_SUBFORM` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemPayload {
    #[serde(rename = "PARTNAME")]
    pub part_name: String,
    #[serde(rename = "PDES", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "TQUANT")]
    pub quantity: i64,
    /// Line total, not unit price.
    #[serde(rename = "PRICE")]
    pub price: f64,
    #[serde(rename = "REMARK1")]
    pub remark: String,
    #[serde(rename = "ROYY_ORDISPECS_SUBFORM", skip_serializing_if = "Option::is_none")]
    pub specs: Option<Vec<SpecOverride>>,
}

/// Per-line spec override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecOverride {
    #[serde(rename = "SPEC")]
    pub spec: String,
    #[serde(rename = "VALUE")]
    pub value: String,
}

/// `PAYMENTDEF_SUBFORM` of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDefinition {
    #[serde(rename = "PAYMENTCODE")]
    pub payment_code: String,
    #[serde(rename = "QPRICE")]
    pub amount: f64,
    #[serde(rename = "PAYCODE")]
    pub pay_code: String,
    #[serde(rename = "PAYACCOUNT")]
    pub account: String,
    #[serde(rename = "VALIDMONTH")]
    pub valid_month: String,
    #[serde(rename = "CCUID")]
    pub card_token: String,
    #[serde(rename = "CONFNUM")]
    pub confirmation: String,
    #[serde(rename = "ROYY_NUMBEROFPAY")]
    pub number_of_payments: f64,
    #[serde(rename = "FIRSTPAY")]
    pub first_payment: f64,
    #[serde(rename = "ROYY_SECONDPAYMENT")]
    pub periodical_payment: f64,
}

/// Raw entry of the spec override line meta.
#[derive(Debug, Deserialize)]
struct RawSpecEntry {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// Decodes the spec override list stored on an order line.
///
/// Absent or malformed meta yields an empty list.
pub fn line_spec_overrides(line: &OrderLine) -> Vec<SpecOverride> {
    let Some(raw) = line.meta.get(SPEC_OVERRIDES_META_KEY) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<RawSpecEntry>>(raw) {
        Ok(entries) => entries
            .into_iter()
            .map(|entry| SpecOverride {
                spec: entry.name,
                value: match entry.value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                },
            })
            .collect(),
        Err(e) => {
            debug!(line_id = line.id, error = %e, "Ignoring malformed spec override meta");
            Vec::new()
        }
    }
}

/// ERP customer number an order is filed under.
pub fn order_customer_number(order: &Order, walkin_number: &str) -> String {
    if order.is_guest() {
        walkin_number.to_string()
    } else {
        order.customer_id.to_string()
    }
}

fn parse_decimal(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(0.0)
}

impl OrderPayload {
    /// Builds the order body.
    ///
    /// Lines whose product no longer exists (no SKU) are skipped; the
    /// shipping pseudo-line is always appended.
    pub fn build(order: &Order, walkin_number: &str, tables: &MappingTables) -> Self {
        let mut items: Vec<OrderItemPayload> = order
            .lines
            .iter()
            .filter_map(|line| {
                let sku = line.sku.as_ref()?;
                Some(OrderItemPayload {
                    part_name: sku.clone(),
                    description: None,
                    quantity: line.quantity,
                    price: line.total.to_decimal(),
                    remark: tables.line_remark(line),
                    specs: Some(line_spec_overrides(line)),
                })
            })
            .collect();

        items.push(OrderItemPayload {
            part_name: SHIPPING_LINE_SKU.to_string(),
            description: Some(tables.shipping_name(order.shipping_method.as_ref())),
            quantity: 1,
            price: order.shipping_total.to_decimal(),
            remark: String::new(),
            specs: None,
        });

        let address_2 = Some(order.shipping.address_2.clone()).filter(|a| !a.is_empty());

        OrderPayload {
            customer_number: order_customer_number(order, walkin_number),
            customer_description: order.billing.full_name(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            order_number: order.number.clone(),
            ship_to: ShipTo {
                name: order.shipping.full_name(),
                phone: order.billing.phone.clone(),
                address: order.shipping.address_1.clone(),
                city: order.shipping.city.clone(),
                country: country_name(&order.shipping.country).to_string(),
                zip: order.shipping.postcode.clone(),
                address_2,
            },
            items,
            payment: PaymentDefinition {
                payment_code: tables.payment_code(&order.payment_method),
                amount: order.total.to_decimal(),
                pay_code: String::new(),
                account: order.meta_value(gateway_meta::CARD_NUMBER).to_string(),
                valid_month: order.meta_value(gateway_meta::EXPIRATION).to_string(),
                card_token: order.meta_value(gateway_meta::TOKEN).to_string(),
                confirmation: order.meta_value(gateway_meta::AUTHORIZATION).to_string(),
                number_of_payments: parse_decimal(order.meta_value(gateway_meta::PAYMENTS)),
                first_payment: parse_decimal(order.meta_value(gateway_meta::FIRST_PAYMENT)),
                periodical_payment: parse_decimal(
                    order.meta_value(gateway_meta::PERIODICAL_PAYMENT),
                ),
            },
        }
    }
}

// =============================================================================
// Receipts
// =============================================================================

/// Body of `POST TINVOICES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPayload {
    #[serde(rename = "CUSTNAME")]
    pub customer_number: String,
    #[serde(rename = "CDES")]
    pub customer_description: String,
    #[serde(rename = "IVDATE")]
    pub date: String,
    #[serde(rename = "BOOKNUM")]
    pub order_number: String,
    /// Cash-on-delivery amount.
    #[serde(rename = "CASHPAYMENT", skip_serializing_if = "Option::is_none")]
    pub cash_payment: Option<f64>,
    /// Card / other payment details.
    #[serde(rename = "TPAYMENT2_SUBFORM", skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<ReceiptPayment>>,
}

/// One `TPAYMENT2_SUBFORM` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptPayment {
    #[serde(rename = "PAYMENTCODE")]
    pub payment_code: String,
    #[serde(rename = "QPRICE")]
    pub amount: f64,
    #[serde(rename = "PAYACCOUNT")]
    pub account: String,
    #[serde(rename = "PAYCODE")]
    pub pay_code: String,
    #[serde(rename = "VALIDMONTH")]
    pub valid_month: String,
    #[serde(rename = "CCUID")]
    pub card_token: String,
    #[serde(rename = "CONFNUM")]
    pub confirmation: String,
}

/// Payment method id that settles in cash.
pub const CASH_ON_DELIVERY: &str = "cod";

impl ReceiptPayload {
    /// Builds the receipt body: cash amount for `cod`, payment block otherwise.
    pub fn build(order: &Order, walkin_number: &str, tables: &MappingTables) -> Self {
        let total = order.total.to_decimal();
        let is_cash = order.payment_method.to_lowercase() == CASH_ON_DELIVERY;

        let (cash_payment, payments) = if is_cash {
            (Some(total), None)
        } else {
            (
                None,
                Some(vec![ReceiptPayment {
                    payment_code: tables.payment_code(&order.payment_method),
                    amount: total,
                    account: order.meta_value(gateway_meta::CARD_NUMBER).to_string(),
                    pay_code: String::new(),
                    valid_month: order.meta_value(gateway_meta::EXPIRATION).to_string(),
                    card_token: order.meta_value(gateway_meta::TOKEN).to_string(),
                    confirmation: order.meta_value(gateway_meta::AUTHORIZATION).to_string(),
                }]),
            )
        };

        ReceiptPayload {
            customer_number: order_customer_number(order, walkin_number),
            customer_description: order.billing.full_name(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            order_number: order.number.clone(),
            cash_payment,
            payments,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{Address, OrderStatus, ProductKind, StockStatus};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample_order() -> Order {
        Order {
            id: 501,
            number: "501".into(),
            customer_id: 42,
            status: OrderStatus::Processing,
            created_at: Utc.with_ymd_and_hms(2024, 3, 7, 14, 30, 0).unwrap(),
            billing: Address {
                first_name: "Dana".into(),
                last_name: "Levi".into(),
                phone: "050-1234567".into(),
                ..Default::default()
            },
            shipping: Address {
                first_name: "Dana".into(),
                last_name: "Levi".into(),
                address_1: "Herzl 1".into(),
                city: "Haifa".into(),
                postcode: "3100000".into(),
                country: "IL".into(),
                ..Default::default()
            },
            shipping_method: Some(ShippingMethod {
                method_id: "flat_rate:3".into(),
                title: "Flat rate".into(),
            }),
            shipping_total: Money::from_cents(2500),
            payment_method: "creditguard".into(),
            total: Money::from_cents(12500),
            lines: vec![
                OrderLine {
                    id: 1,
                    sku: Some("A1".into()),
                    quantity: 2,
                    total: Money::from_cents(10000),
                    meta: BTreeMap::from([
                        ("engraving".to_string(), "For Noa".to_string()),
                        (
                            SPEC_OVERRIDES_META_KEY.to_string(),
                            r#"[{"name":"Color","value":"Gold"},{"name":"Size","value":7}]"#
                                .to_string(),
                        ),
                    ]),
                },
                OrderLine {
                    id: 2,
                    sku: None,
                    quantity: 1,
                    total: Money::from_cents(500),
                    meta: BTreeMap::new(),
                },
            ],
            meta: BTreeMap::from([
                (gateway_meta::CARD_NUMBER.to_string(), "4580".to_string()),
                (gateway_meta::PAYMENTS.to_string(), "3".to_string()),
            ]),
        }
    }

    fn tables() -> MappingTables {
        MappingTables {
            shipping: BTreeMap::from([("flat_rate_3".to_string(), "DHL".to_string())]),
            payment: BTreeMap::from([("creditguard".to_string(), "11".to_string())]),
            line_parameters: BTreeMap::from([("engraving".to_string(), "REMARK1".to_string())]),
        }
    }

    #[test]
    fn test_item_payload_from_product() {
        let product = CatalogProduct {
            id: 7,
            parent_id: None,
            kind: ProductKind::Simple,
            sku: "A1".into(),
            title: "Widget".into(),
            regular_price: Money::from_cents(999),
            price: Money::from_cents(899),
            manage_stock: false,
            stock_quantity: None,
            stock_status: StockStatus::InStock,
            cross_sell_ids: vec![],
        };

        let body = serde_json::to_value(ItemPayload::from_product(&product)).unwrap();
        assert_eq!(
            body,
            json!({"PARTNAME": "A1", "PARTDES": "Widget", "BASEPLPRICE": 9.99, "INVFLAG": "N"})
        );
    }

    #[test]
    fn test_customer_payload_requires_both_names() {
        let mut profile = UserProfile {
            id: 42,
            email: "dana@example.com".into(),
            first_name: Some("Dana".into()),
            last_name: None,
            billing: Address {
                address_1: "Herzl 1".into(),
                city: "Haifa".into(),
                country: "IL".into(),
                ..Default::default()
            },
            roles: vec!["customer".into()],
        };

        let payload = CustomerPayload::build(&profile, "42");
        assert_eq!(payload.description, "");
        assert_eq!(payload.branch, "1");
        assert_eq!(payload.city, "Haifa");
        assert_eq!(payload.country, "Israel");

        profile.last_name = Some("Levi".into());
        assert_eq!(CustomerPayload::build(&profile, "42").description, "Dana Levi");
    }

    #[test]
    fn test_order_payload_lines_and_shipping_row() {
        let payload = OrderPayload::build(&sample_order(), "WALKIN", &tables());

        assert_eq!(payload.customer_number, "42");
        assert_eq!(payload.customer_description, "Dana Levi");
        assert_eq!(payload.date, "2024-03-07");

        // Line without a product is skipped, shipping row appended.
        assert_eq!(payload.items.len(), 2);
        let line = &payload.items[0];
        assert_eq!(line.part_name, "A1");
        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, 100.0);
        assert_eq!(line.remark, "For Noa");
        assert_eq!(
            line.specs.as_deref().unwrap(),
            &[
                SpecOverride { spec: "Color".into(), value: "Gold".into() },
                SpecOverride { spec: "Size".into(), value: "7".into() },
            ]
        );

        let shipping = &payload.items[1];
        assert_eq!(shipping.part_name, "000");
        assert_eq!(shipping.description.as_deref(), Some("DHL"));
        assert_eq!(shipping.price, 25.0);
        assert!(shipping.specs.is_none());
    }

    #[test]
    fn test_order_payload_wire_shape() {
        let body = serde_json::to_value(OrderPayload::build(&sample_order(), "W", &tables())).unwrap();

        assert_eq!(body["SHIPTO2_SUBFORM"]["COUNTRYNAME"], "Israel");
        assert!(body["SHIPTO2_SUBFORM"].get("ADDRESS2").is_none());
        assert_eq!(body["PAYMENTDEF_SUBFORM"]["PAYMENTCODE"], "11");
        assert_eq!(body["PAYMENTDEF_SUBFORM"]["PAYACCOUNT"], "4580");
        assert_eq!(body["PAYMENTDEF_SUBFORM"]["ROYY_NUMBEROFPAY"], 3.0);
        assert_eq!(body["PAYMENTDEF_SUBFORM"]["FIRSTPAY"], 0.0);
        assert!(body["ORDERITEMS_SUBFORM"][1].get("ROYY_ORDISPECS_SUBFORM").is_none());
    }

    #[test]
    fn test_guest_order_uses_walkin_number() {
        let mut order = sample_order();
        order.customer_id = 0;
        order.shipping.address_2 = "Apt 4".into();
        order.shipping_method = None;

        let payload = OrderPayload::build(&order, "WALKIN", &MappingTables::default());
        assert_eq!(payload.customer_number, "WALKIN");
        assert_eq!(payload.ship_to.address_2.as_deref(), Some("Apt 4"));
        assert_eq!(payload.payment.payment_code, "creditguard");
        assert_eq!(payload.items.last().unwrap().description.as_deref(), Some(""));
    }

    #[test]
    fn test_unmapped_shipping_falls_back_to_label() {
        let method = ShippingMethod {
            method_id: "local_pickup:1".into(),
            title: "Local pickup".into(),
        };
        assert_eq!(tables().shipping_name(Some(&method)), "Local pickup");
    }

    #[test]
    fn test_malformed_spec_meta_is_empty() {
        let line = OrderLine {
            id: 9,
            sku: Some("A1".into()),
            quantity: 1,
            total: Money::zero(),
            meta: BTreeMap::from([(SPEC_OVERRIDES_META_KEY.to_string(), "not json".to_string())]),
        };
        assert!(line_spec_overrides(&line).is_empty());
    }

    #[test]
    fn test_receipt_cash_on_delivery() {
        let mut order = sample_order();
        order.payment_method = "COD".into();

        let body = serde_json::to_value(ReceiptPayload::build(&order, "W", &tables())).unwrap();
        assert_eq!(body["CASHPAYMENT"], 125.0);
        assert!(body.get("TPAYMENT2_SUBFORM").is_none());
        assert_eq!(body["IVDATE"], "2024-03-07");
    }

    #[test]
    fn test_receipt_card_payment_block() {
        let payload = ReceiptPayload::build(&sample_order(), "W", &tables());

        assert!(payload.cash_payment.is_none());
        let payments = payload.payments.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_code, "11");
        assert_eq!(payments[0].amount, 125.0);
        assert_eq!(payments[0].account, "4580");
        assert_eq!(payments[0].pay_code, "");
    }
}
