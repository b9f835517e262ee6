//! Blob mirror configuration.

use serde::{Deserialize, Serialize};

/// Where mirrored algorithm documents are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one `<algorithm-id>.json` file per algorithm.
    #[serde(default = "default_blob_root")]
    pub blob_root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            blob_root: default_blob_root(),
        }
    }
}

fn default_blob_root() -> String {
    "./data/algorithms".to_string()
}
