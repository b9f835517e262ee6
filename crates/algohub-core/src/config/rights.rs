//! Limits applied while resolving rights and validating content.

use serde::{Deserialize, Serialize};

/// Rights resolution and content nesting limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightsConfig {
    /// Maximum folder nesting depth. Ancestry walks longer than this are
    /// treated as corrupt data, and creates/moves past it are rejected.
    #[serde(default = "default_max_folder_depth")]
    pub max_folder_depth: usize,
    /// Maximum nesting depth of nodes inside an algorithm document.
    #[serde(default = "default_max_content_depth")]
    pub max_content_depth: usize,
}

impl Default for RightsConfig {
    fn default() -> Self {
        Self {
            max_folder_depth: default_max_folder_depth(),
            max_content_depth: default_max_content_depth(),
        }
    }
}

fn default_max_folder_depth() -> usize {
    32
}

fn default_max_content_depth() -> usize {
    64
}
