#![allow(dead_code)]

use std::path::Path;

use adminctl::config::{ApiConfig, ConfigV1, FileStorageConfig, StorageBackend, StorageConfig};
use adminctl::startup::build_state;
use adminctl::state::AppState;
use serde_json::{Value, json};

/// Application state talking to `base_url`, persisting the token under `dir`.
pub fn build_app(base_url: &str, dir: &Path) -> AppState {
    let config = ConfigV1 {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_in_ms: Some(5_000),
        },
        storage: StorageConfig {
            enabled: true,
            backend: Some(StorageBackend::File(FileStorageConfig {
                path: dir.join("session.json"),
            })),
        },
        ..ConfigV1::default()
    };
    build_state(config).expect("failed to build app state")
}

pub fn user_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "full_name": "Test User",
        "role": role,
        "is_approved": true,
        "is_active": true,
        "created_at": "2024-03-01T09:00:00"
    })
}

pub fn token_json(token: &str, role: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "role": role,
        "is_approved": true
    })
}
