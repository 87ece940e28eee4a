use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Origin of the admin panel backend when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the backend lives and how long we are willing to wait for it.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_in_ms: None,
        }
    }
}
