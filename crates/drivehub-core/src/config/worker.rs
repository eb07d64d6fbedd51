//! Sweep worker configuration.

use serde::{Deserialize, Serialize};

/// Schedules and limits for the periodic sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for purging marked-deleted subtrees (every 10 minutes).
    #[serde(default = "default_purge_schedule")]
    pub purge_schedule: String,
    /// Cron expression for purging unreferenced blobs (daily at 3 AM).
    #[serde(default = "default_orphan_schedule")]
    pub orphan_schedule: String,
    /// Minimum age in hours before an unreferenced blob may be removed.
    #[serde(default = "default_orphan_retention")]
    pub orphan_retention_hours: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            purge_schedule: default_purge_schedule(),
            orphan_schedule: default_orphan_schedule(),
            orphan_retention_hours: default_orphan_retention(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_purge_schedule() -> String {
    "0 */10 * * * *".to_string()
}

fn default_orphan_schedule() -> String {
    "0 0 3 * * *".to_string()
}

fn default_orphan_retention() -> u64 {
    24
}
