use http::{HeaderMap, Method, StatusCode};

use crate::error::BoxError;

/// A fully assembled request: absolute URL, final headers, JSON-encoded body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Status and raw body of whatever the server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Issues one HTTP request and hands back the response.
///
/// Implementations do not interpret status codes and never retry; any error
/// returned here is a transport-level failure (DNS, refused connection, timeout).
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    fn get_name(&self) -> &str;
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, BoxError>;
}
