//! Per-plan storage ceilings.

use serde::{Deserialize, Serialize};

/// Byte ceilings for each subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Ceiling for the NORMAL plan (default 5 GiB).
    #[serde(default = "default_normal")]
    pub normal_limit_bytes: u64,
    /// Ceiling for the PRO plan (default 100 GiB).
    #[serde(default = "default_pro")]
    pub pro_limit_bytes: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            normal_limit_bytes: default_normal(),
            pro_limit_bytes: default_pro(),
        }
    }
}

fn default_normal() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_pro() -> u64 {
    100 * 1024 * 1024 * 1024
}
