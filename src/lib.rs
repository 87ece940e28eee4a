//! Library exports for adminctl, shared between the binary and tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod startup;
pub mod state;
pub mod storage;
pub mod transport;
pub mod utils;

pub use api::{ApiClient, RequestOptions};
pub use error::{ApiError, StorageError};
pub use session::{AuthStore, Session};
