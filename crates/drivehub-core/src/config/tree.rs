//! Hierarchy traversal limits.

use serde::{Deserialize, Serialize};

/// Bounds applied to every walk over the resource forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum number of levels an ancestor walk or subtree traversal may
    /// visit before the chain is treated as malformed.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

fn default_max_depth() -> usize {
    256
}
