use std::sync::Arc;

use tracing::{info, warn};

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";

/// A durable string key-value store living outside process memory.
///
/// The auth store is the only writer of [`TOKEN_KEY`] in this crate, but other
/// processes may write the same backing medium; there is no locking or versioning.
pub trait TokenStorage: Send + Sync {
    fn get_name(&self) -> &str;
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Creates a concrete storage implementation based on the StorageConfig.
/// If `storage.enabled = false`, tokens are kept in memory only.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn TokenStorage> {
    if !config.enabled {
        info!("Token storage is disabled. Tokens will not outlive this process.");
        return Arc::new(MemoryStorage::new());
    }

    match &config.backend {
        Some(StorageBackend::File(file_config)) => {
            info!("Using file token storage at '{}'", file_config.path.display());
            Arc::new(FileStorage::new(&file_config.path))
        }
        Some(StorageBackend::Memory) => {
            info!("Using in-memory token storage.");
            Arc::new(MemoryStorage::new())
        }
        None => {
            warn!("Storage is enabled, but no backend config is provided; using memory.");
            Arc::new(MemoryStorage::new())
        }
    }
}
