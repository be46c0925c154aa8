//! Test doubles for engine flows: a scripted ERP and a recording notifier.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ledgerlink_core::{Address, ItemUpsert, Money, Order, OrderLine, OrderStatus, ShippingMethod};
use ledgerlink_db::{Database, DbConfig};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::SyncEngine;
use crate::client::{ErpClient, ErpMethod, ErpResponse};
use crate::config::BridgeConfig;
use crate::report::{ErrorReport, Notifier};
use crate::sqlite::SqliteStorefront;

pub(crate) fn ok(body: &str) -> ErpResponse {
    status(200, body)
}

pub(crate) fn status(code: u16, body: &str) -> ErpResponse {
    ErpResponse {
        ok: (200..300).contains(&code),
        status_code: code,
        raw_body: body.to_string(),
    }
}

/// One call the engine made.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedCall {
    pub method: ErpMethod,
    pub resource: String,
    pub body: Option<String>,
}

impl RecordedCall {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

struct Route {
    method: ErpMethod,
    resource: String,
    responses: VecDeque<ErpResponse>,
}

/// ERP double answering by (method, resource).
///
/// Responses queued for a route are served in order; the last one repeats.
/// Unknown routes answer 404.
#[derive(Default)]
pub(crate) struct ScriptedErp {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedErp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: ErpMethod, resource: &str, response: ErpResponse) -> Self {
        {
            let mut routes = self.routes.lock().unwrap();
            match routes
                .iter_mut()
                .find(|r| r.method == method && r.resource == resource)
            {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    method,
                    resource: resource.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: ErpMethod, resource: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.resource == resource)
            .collect()
    }
}

#[async_trait]
impl ErpClient for ScriptedErp {
    async fn request(&self, method: ErpMethod, resource: &str, body: Option<&str>) -> ErpResponse {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            resource: resource.to_string(),
            body: body.map(str::to_string),
        });

        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes
            .iter_mut()
            .find(|r| r.method == method && r.resource == resource)
        else {
            return status(404, "no route");
        };

        if route.responses.len() > 1 {
            route.responses.pop_front().unwrap()
        } else {
            route.responses.front().cloned().unwrap()
        }
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("https://erp.example.com/odata/Priority/tabula.ini/demo/{resource}")
    }
}

/// Notifier keeping every report.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    reports: Mutex<Vec<ErrorReport>>,
}

impl RecordingNotifier {
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, report: &ErrorReport) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

pub(crate) fn config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.erp.url = "https://erp.example.com".into();
    config.erp.application = "tabula.ini".into();
    config.erp.environment = "demo".into();
    config.store.walkin_number = "WALKIN".into();
    config.notifications.default_recipient = "admin@example.com".into();
    config
        .notifications
        .recipients
        .insert("sync_inventory_priority".into(), "inventory@example.com".into());
    config
}

pub(crate) struct Harness {
    pub engine: Arc<SyncEngine>,
    pub erp: Arc<ScriptedErp>,
    pub notifier: Arc<RecordingNotifier>,
    pub db: Database,
}

pub(crate) async fn harness(erp: ScriptedErp) -> Harness {
    harness_with(erp, config()).await
}

pub(crate) async fn harness_with(erp: ScriptedErp, config: BridgeConfig) -> Harness {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let erp = Arc::new(erp);
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Arc::new(SyncEngine::with_notifier(
        config,
        db.clone(),
        erp.clone(),
        Arc::new(SqliteStorefront::new(db.clone())),
        notifier.clone(),
    ));

    Harness {
        engine,
        erp,
        notifier,
        db,
    }
}

/// Stores a one-line order for product `A1` (created when missing).
pub(crate) async fn seed_order(
    h: &Harness,
    id: i64,
    customer_id: i64,
    status: OrderStatus,
    payment_method: &str,
) -> Order {
    if h.db.catalog().find_id_by_sku("A1").await.unwrap().is_none() {
        h.db.catalog()
            .create_simple(&ItemUpsert {
                sku: "A1".into(),
                title: "Widget".into(),
                price: Money::from_cents(999),
                manage_stock: false,
            })
            .await
            .unwrap();
    }

    let address = Address {
        first_name: "Dana".into(),
        last_name: "Levi".into(),
        address_1: "Herzl 1".into(),
        city: "Haifa".into(),
        country: "IL".into(),
        phone: "050-1234567".into(),
        ..Default::default()
    };
    let order = Order {
        id,
        number: id.to_string(),
        customer_id,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 3, 7, 14, 30, 0).unwrap(),
        billing: address.clone(),
        shipping: address,
        shipping_method: Some(ShippingMethod {
            method_id: "flat_rate:3".into(),
            title: "Flat rate".into(),
        }),
        shipping_total: Money::from_cents(2500),
        payment_method: payment_method.into(),
        total: Money::from_cents(4498),
        lines: vec![OrderLine {
            id: id * 10,
            sku: Some("A1".into()),
            quantity: 2,
            total: Money::from_cents(1998),
            meta: BTreeMap::new(),
        }],
        meta: BTreeMap::from([("_ccnumber".to_string(), "4580".to_string())]),
    };
    h.db.orders().insert(&order).await.unwrap();
    order
}
