use std::time::Duration;

use tracing::info;

use super::{ApiRequest, ApiResponse, HttpTransport};
use crate::config::ApiConfig;
use crate::error::BoxError;

/// The production transport, a thin shell around `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_in_ms) = config.timeout_in_ms {
            info!("Requests time out after {} ms", timeout_in_ms);
            builder = builder.timeout(Duration::from_millis(timeout_in_ms));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    fn get_name(&self) -> &str {
        "reqwest"
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}
