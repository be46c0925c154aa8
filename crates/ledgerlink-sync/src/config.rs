//! # Bridge Configuration
//!
//! Configuration management for the sync engine and daemon.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LEDGERLINK_ERP_URL=https://erp.example.com                         │
//! │     LEDGERLINK_ERP_PASSWORD=...                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/ledgerlink/bridge.toml (Linux)                           │
//! │     ~/Library/Application Support/com.ledgerlink.ledgerlink/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ERP connection left empty: validation refuses to start             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bridge.toml
//! sync_receipts_on_order = true
//!
//! [erp]
//! url = "https://erp.example.com"
//! application = "tabula.ini"
//! environment = "demo"
//! username = "api"
//! password = "secret"
//!
//! [store]
//! walkin_number = "WALKIN"
//!
//! [mapping.shipping]
//! flat_rate_3 = "SHIP-FLAT"
//!
//! [mapping.payment]
//! creditguard = "CG"
//!
//! [notifications.recipients]
//! sync_orders_web = "ops@example.com"
//!
//! [logging]
//! inventory_priority = false
//!
//! [[schedule]]
//! sync_name = "sync_inventory_priority"
//! schedule = "15m"
//! ```

use ledgerlink_core::payload::MappingTables;
use ledgerlink_core::DEFAULT_TENANT_ID;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;
use crate::schedule::{enabled_schedules, ScheduleEntry, ScheduledSync};

// =============================================================================
// ERP Connection
// =============================================================================

/// Where the Priority OData service lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErpSettings {
    /// Base URL of the ERP host (`https://erp.example.com`).
    #[serde(default)]
    pub url: String,

    /// Priority application (company file), e.g. `tabula.ini`.
    #[serde(default)]
    pub application: String,

    /// Priority environment (company), e.g. `demo`.
    #[serde(default)]
    pub environment: String,

    /// HTTP basic credentials.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

impl ErpSettings {
    /// Service root every resource is appended to.
    ///
    /// ## Example
    /// ```rust
    /// use ledgerlink_sync::config::ErpSettings;
    ///
    /// let erp = ErpSettings {
    ///     url: "https://erp.example.com/".into(),
    ///     application: "tabula.ini".into(),
    ///     environment: "demo".into(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(erp.service_root(), "https://erp.example.com/odata/Priority/tabula.ini/demo/");
    /// ```
    pub fn service_root(&self) -> String {
        format!(
            "{}/odata/Priority/{}/{}/",
            self.url.trim_end_matches('/'),
            self.application,
            self.environment
        )
    }
}

// =============================================================================
// Store
// =============================================================================

/// Storefront-side settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Tenant owning the price list rows.
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,

    /// ERP customer number for guest checkouts.
    #[serde(default)]
    pub walkin_number: String,

    /// Currency shown to shoppers without a price list.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

fn default_tenant_id() -> String {
    DEFAULT_TENANT_ID.to_string()
}

fn default_currency() -> String {
    "ILS".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            tenant_id: default_tenant_id(),
            walkin_number: String::new(),
            default_currency: default_currency(),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Local SQLite database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "ledgerlink", "ledgerlink")
        .map(|dirs| dirs.data_dir().join("ledgerlink.db"))
        .unwrap_or_else(|| PathBuf::from("ledgerlink.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
        }
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Who receives error reports, per sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Used when a sync has no recipient of its own.
    #[serde(default)]
    pub default_recipient: String,

    /// Admin sync name → recipient.
    #[serde(default)]
    pub recipients: BTreeMap<String, String>,
}

impl NotificationSettings {
    /// Recipient for a sync name, falling back to the default recipient.
    pub fn recipient_for(&self, sync_name: &str) -> String {
        self.recipients
            .get(sync_name)
            .filter(|r| !r.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.default_recipient.clone())
    }
}

// =============================================================================
// Request Logging
// =============================================================================

/// Per-sync switches for the ERP request log. All on by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_true")]
    pub items_priority: bool,
    #[serde(default = "default_true")]
    pub items_priority_variation: bool,
    #[serde(default = "default_true")]
    pub inventory_priority: bool,
    #[serde(default = "default_true")]
    pub items_web: bool,
    #[serde(default = "default_true")]
    pub pricelist_priority: bool,
    #[serde(default = "default_true")]
    pub customers_web: bool,
    #[serde(default = "default_true")]
    pub orders_web: bool,
    #[serde(default = "default_true")]
    pub receipts_priority: bool,

    /// Request log rows older than this are pruned (days).
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            items_priority: true,
            items_priority_variation: true,
            inventory_priority: true,
            items_web: true,
            pricelist_priority: true,
            customers_web: true,
            orders_web: true,
            receipts_priority: true,
            retention_days: default_retention_days(),
        }
    }
}

impl LoggingSettings {
    /// Whether calls made by `kind` are recorded.
    pub fn enabled(&self, kind: SyncKind) -> bool {
        match kind {
            SyncKind::Items => self.items_priority,
            SyncKind::Variations => self.items_priority_variation,
            SyncKind::Inventory => self.inventory_priority,
            SyncKind::ItemExport => self.items_web,
            SyncKind::PriceLists => self.pricelist_priority,
            SyncKind::Customers => self.customers_web,
            SyncKind::Orders => self.orders_web,
            SyncKind::Receipts => self.receipts_priority,
        }
    }
}

// =============================================================================
// Server
// =============================================================================

/// Daemon HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind: default_bind(),
        }
    }
}

// =============================================================================
// Main Bridge Configuration
// =============================================================================

/// Complete bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Send the receipt right after an order is processed.
    #[serde(default)]
    pub sync_receipts_on_order: bool,

    #[serde(default)]
    pub erp: ErpSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    /// Shipping, payment and line parameter translation tables.
    #[serde(default)]
    pub mapping: MappingTables,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub server: ServerSettings,

    /// Declarative schedule table.
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

impl BridgeConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bridge.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading bridge config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load bridge config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Bridge config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// The ERP url, application and environment are required; without them
    /// no sync can run.
    pub fn validate(&self) -> SyncResult<()> {
        if self.erp.url.trim().is_empty() {
            return Err(SyncError::InvalidConfig("erp.url is not set".into()));
        }
        if self.erp.application.trim().is_empty() {
            return Err(SyncError::InvalidConfig("erp.application is not set".into()));
        }
        if self.erp.environment.trim().is_empty() {
            return Err(SyncError::InvalidConfig("erp.environment is not set".into()));
        }

        let url = url::Url::parse(&self.erp.url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "ERP URL must start with http:// or https://, got: {}",
                self.erp.url
            )));
        }

        if self.erp.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "erp.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.store.tenant_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("store.tenant_id is empty".into()));
        }

        if self.store.walkin_number.trim().is_empty() {
            warn!("store.walkin_number is empty; guest orders will carry no customer number");
        }

        self.server.bind.parse::<SocketAddr>().map_err(|e| {
            SyncError::InvalidConfig(format!("server.bind '{}': {}", self.server.bind, e))
        })?;

        enabled_schedules(&self.schedule)?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("LEDGERLINK_ERP_URL") {
            debug!(url = %url, "Overriding ERP URL from environment");
            self.erp.url = url;
        }

        if let Ok(application) = std::env::var("LEDGERLINK_ERP_APPLICATION") {
            self.erp.application = application;
        }

        if let Ok(environment) = std::env::var("LEDGERLINK_ERP_ENVIRONMENT") {
            self.erp.environment = environment;
        }

        if let Ok(username) = std::env::var("LEDGERLINK_ERP_USERNAME") {
            self.erp.username = Some(username);
        }

        if let Ok(password) = std::env::var("LEDGERLINK_ERP_PASSWORD") {
            self.erp.password = Some(password);
        }

        if let Ok(timeout) = std::env::var("LEDGERLINK_ERP_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.erp.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring invalid LEDGERLINK_ERP_TIMEOUT_SECS"),
            }
        }

        if let Ok(walkin) = std::env::var("LEDGERLINK_WALKIN_NUMBER") {
            self.store.walkin_number = walkin;
        }

        if let Ok(path) = std::env::var("LEDGERLINK_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(bind) = std::env::var("LEDGERLINK_BIND") {
            self.server.bind = bind;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ledgerlink", "ledgerlink")
            .map(|dirs| dirs.config_dir().join("bridge.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the tenant id.
    pub fn tenant_id(&self) -> &str {
        &self.store.tenant_id
    }

    /// Returns the guest customer number.
    pub fn walkin_number(&self) -> &str {
        &self.store.walkin_number
    }

    /// Error report recipient for a sync.
    pub fn recipient_for(&self, sync_name: &str) -> String {
        self.notifications.recipient_for(sync_name)
    }

    /// Enabled schedule rows, resolved.
    pub fn scheduled_syncs(&self) -> SyncResult<Vec<ScheduledSync>> {
        enabled_schedules(&self.schedule)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
