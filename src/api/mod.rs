//! The request gateway and the named backend calls built on top of it.

pub mod client;
pub mod endpoints;

pub use client::{ApiClient, RequestOptions};
