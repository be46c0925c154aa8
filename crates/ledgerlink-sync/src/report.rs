//! # Error Reports
//!
//! Every remote failure produces one [`ErrorReport`] handed to a
//! [`Notifier`]. Delivery (mail, chat, ...) is the notifier's business.
//!
//! ```text
//! remote failure ──► ErrorReport { recipient, subject, body } ──► Notifier
//!                     │            │          │
//!                     │            │          └── raw ERP body
//!                     │            └── "Error Sync Orders"
//!                     └── [notifications] recipient for the sync
//! ```

use serde::Serialize;
use tracing::{error, warn};

use crate::kind::SyncKind;

/// One failure notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Empty when no recipient is configured.
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl ErrorReport {
    /// Report for a failed ERP call made by a sync.
    pub fn remote(kind: SyncKind, recipient: String, raw_body: &str) -> Self {
        ErrorReport {
            recipient,
            subject: kind.error_subject().to_string(),
            body: raw_body.to_string(),
        }
    }

    /// Report for a failure the admin screen saw before reaching the engine.
    ///
    /// ## Example
    /// ```rust
    /// use ledgerlink_sync::report::ErrorReport;
    ///
    /// let report = ErrorReport::admin("sync_items_priority", String::new(), "timeout");
    /// assert_eq!(report.subject, "Error Sync Items Priority");
    /// assert_eq!(report.body, "AJAX ERROR<br>timeout");
    /// ```
    pub fn admin(sync_name: &str, recipient: String, message: &str) -> Self {
        ErrorReport {
            recipient,
            subject: format!("Error {}", title_case(sync_name)),
            body: format!("AJAX ERROR<br>{}", message),
        }
    }
}

/// `sync_items_priority` → `Sync Items Priority`.
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Notifier Trait
// =============================================================================

/// Receives error reports.
pub trait Notifier: Send + Sync {
    fn notify(&self, report: &ErrorReport);
}

/// Writes reports to the tracing log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, report: &ErrorReport) {
        if report.recipient.is_empty() {
            warn!(subject = %report.subject, "Error report has no recipient");
        }
        error!(
            recipient = %report.recipient,
            subject = %report.subject,
            body = %report.body,
            "Sync error report"
        );
    }
}

/// Drops every report.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _report: &ErrorReport) {}
}
