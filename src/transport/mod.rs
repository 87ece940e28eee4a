pub mod base;
pub mod reqwest_transport;

pub use base::{ApiRequest, ApiResponse, HttpTransport};
pub use reqwest_transport::ReqwestTransport;
