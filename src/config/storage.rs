use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A wrapper for the token storage configuration:
/// - enabled: if false, tokens only live for the lifetime of the process.
/// - backend: the actual storage backend (file, memory).
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub backend: Option<StorageBackend>,
}

/// The existing storage backends, told apart by a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum StorageBackend {
    #[serde(rename = "file")]
    File(FileStorageConfig),
    #[serde(rename = "memory")]
    Memory,
}

#[derive(Deserialize, Serialize, Debug, JsonSchema, Clone, PartialEq)]
pub struct FileStorageConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

fn default_enabled() -> bool {
    true
}

fn default_path() -> PathBuf {
    PathBuf::from("./.adminctl/session.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: Some(StorageBackend::File(FileStorageConfig {
                path: default_path(),
            })),
        }
    }
}
