//! Customer sync: storefront users → ERP customers.
//!
//! ```text
//! user id 0 ─────────────────────────────► WalkIn (no call)
//! user with _priority_customer_number ───► PATCH CUSTOMERS
//! user without it ───────────────────────► POST CUSTOMERS, then record id
//! ```

use ledgerlink_core::payload::CustomerPayload;
use ledgerlink_core::CUSTOMER_NUMBER_META_KEY;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{BulkSummary, SyncEngine};
use crate::client::ErpMethod;
use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;

const RESOURCE: &str = "CUSTOMERS";

/// What a single customer sync did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CustomerOutcome {
    /// Guest: the configured walk-in number applies, nothing was sent.
    WalkIn { customer_number: String },
    Created { customer_number: String },
    Updated { customer_number: String },
}

impl CustomerOutcome {
    pub fn customer_number(&self) -> &str {
        match self {
            CustomerOutcome::WalkIn { customer_number }
            | CustomerOutcome::Created { customer_number }
            | CustomerOutcome::Updated { customer_number } => customer_number,
        }
    }
}

impl SyncEngine {
    /// Creates or updates the ERP customer of one user.
    ///
    /// A new customer's number is the user id, recorded once the POST
    /// succeeds.
    pub async fn sync_customer(&self, user_id: i64) -> SyncResult<CustomerOutcome> {
        let kind = SyncKind::Customers;

        if user_id == 0 {
            debug!("Guest customer, using walk-in number");
            return Ok(CustomerOutcome::WalkIn {
                customer_number: self.config.walkin_number().to_string(),
            });
        }

        let profile = self
            .store
            .user_profile(user_id)
            .await?
            .ok_or_else(|| SyncError::not_found("User", user_id))?;

        let recorded = self
            .store
            .user_meta(user_id, CUSTOMER_NUMBER_META_KEY)
            .await?
            .filter(|number| !number.trim().is_empty());

        let (method, customer_number) = match recorded {
            Some(number) => (ErpMethod::Patch, number),
            None => (ErpMethod::Post, user_id.to_string()),
        };

        let payload = CustomerPayload::build(&profile, &customer_number);
        self.send(kind, method, RESOURCE, &payload).await?;

        let outcome = match method {
            ErpMethod::Post => {
                self.store
                    .add_user_meta_if_absent(user_id, CUSTOMER_NUMBER_META_KEY, &customer_number)
                    .await?;
                CustomerOutcome::Created { customer_number }
            }
            _ => CustomerOutcome::Updated { customer_number },
        };

        self.record_run(kind).await?;

        info!(user_id, customer_number = outcome.customer_number(), %method, "Customer synced");
        Ok(outcome)
    }

    /// Syncs every user with the customer role.
    pub async fn sync_all_customers(&self) -> SyncResult<BulkSummary> {
        let _guard = self.try_guard(SyncKind::Customers)?;
        let ids = self.store.customer_ids().await?;
        info!(count = ids.len(), "Starting customer sync");
        Ok(self.customers_in_turn(&ids).await)
    }

    /// Syncs the given users; a failing user does not stop the rest.
    pub async fn sync_customers(&self, user_ids: &[i64]) -> SyncResult<BulkSummary> {
        let _guard = self.try_guard(SyncKind::Customers)?;
        Ok(self.customers_in_turn(user_ids).await)
    }

    /// Registration hook.
    pub async fn on_user_registered(&self, user_id: i64) -> SyncResult<CustomerOutcome> {
        debug!(user_id, "User registered");
        self.sync_customer(user_id).await
    }

    async fn customers_in_turn(&self, user_ids: &[i64]) -> BulkSummary {
        let mut summary = BulkSummary::default();
        for &user_id in user_ids {
            match self.sync_customer(user_id).await {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    warn!(user_id, error = %e, "Customer sync failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Customer sync complete"
        );
        summary
    }
}
