//! # Schedule Table
//!
//! Declarative `{sync_name, schedule, enabled}` rows. The engine only
//! exposes operations; the daemon turns enabled rows into interval tasks.
//!
//! ```toml
//! [[schedule]]
//! sync_name = "sync_items_priority"
//! schedule = "hourly"
//!
//! [[schedule]]
//! sync_name = "sync_inventory_priority"
//! schedule = "15m"
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;

const HOUR: u64 = 60 * 60;

/// How often a sync runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Hourly,
    TwiceDaily,
    Daily,
    Weekly,
    /// Custom interval from `<n>m` or `<n>s`.
    Every(Duration),
}

impl Schedule {
    /// Time between two runs.
    pub fn interval(&self) -> Duration {
        match self {
            Schedule::Hourly => Duration::from_secs(HOUR),
            Schedule::TwiceDaily => Duration::from_secs(12 * HOUR),
            Schedule::Daily => Duration::from_secs(24 * HOUR),
            Schedule::Weekly => Duration::from_secs(7 * 24 * HOUR),
            Schedule::Every(interval) => *interval,
        }
    }
}

impl FromStr for Schedule {
    type Err = SyncError;

    /// Parses `hourly`, `twicedaily`, `daily`, `weekly`, `<n>m` or `<n>s`.
    ///
    /// ## Example
    /// ```rust
    /// use ledgerlink_sync::schedule::Schedule;
    /// use std::time::Duration;
    ///
    /// let schedule: Schedule = "15m".parse().unwrap();
    /// assert_eq!(schedule.interval(), Duration::from_secs(900));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "hourly" => return Ok(Schedule::Hourly),
            "twicedaily" => return Ok(Schedule::TwiceDaily),
            "daily" => return Ok(Schedule::Daily),
            "weekly" => return Ok(Schedule::Weekly),
            _ => {}
        }

        let invalid = || {
            SyncError::InvalidConfig(format!(
                "Unknown schedule: '{}'. Valid options: hourly, twicedaily, daily, weekly, <n>m, <n>s",
                s
            ))
        };

        let unit = value.chars().last().ok_or_else(invalid)?;
        let digits = &value[..value.len() - unit.len_utf8()];
        let amount: u64 = digits.parse().map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }

        match unit {
            'm' => {
                let secs = amount.checked_mul(60).ok_or_else(invalid)?;
                Ok(Schedule::Every(Duration::from_secs(secs)))
            }
            's' => Ok(Schedule::Every(Duration::from_secs(amount))),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Hourly => write!(f, "hourly"),
            Schedule::TwiceDaily => write!(f, "twicedaily"),
            Schedule::Daily => write!(f, "daily"),
            Schedule::Weekly => write!(f, "weekly"),
            Schedule::Every(interval) => write!(f, "{}s", interval.as_secs()),
        }
    }
}

// =============================================================================
// Schedule Entries
// =============================================================================

/// One row of the `[[schedule]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Admin name of the sync (`sync_items_priority`, ...).
    pub sync_name: String,

    /// Schedule expression.
    pub schedule: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// A validated, enabled schedule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSync {
    pub kind: SyncKind,
    pub schedule: Schedule,
}

impl ScheduleEntry {
    /// Resolves the row's sync kind and schedule.
    pub fn resolve(&self) -> SyncResult<ScheduledSync> {
        let kind = SyncKind::from_sync_name(&self.sync_name).ok_or_else(|| {
            SyncError::InvalidConfig(format!("Unknown sync in schedule: '{}'", self.sync_name))
        })?;
        Ok(ScheduledSync {
            kind,
            schedule: self.schedule.parse()?,
        })
    }
}

/// Enabled rows of a schedule table, resolved.
pub fn enabled_schedules(entries: &[ScheduleEntry]) -> SyncResult<Vec<ScheduledSync>> {
    entries
        .iter()
        .filter(|entry| entry.enabled)
        .map(ScheduleEntry::resolve)
        .collect()
}
