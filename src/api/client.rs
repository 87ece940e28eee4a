use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::ErrorBody;
use crate::storage::{TokenStorage, TOKEN_KEY};
use crate::transport::{ApiRequest, HttpTransport};

pub(crate) const SIGNUP_PATH: &str = "/auth/signup";
pub(crate) const LOGIN_PATH: &str = "/auth/login";

/// Only this many leading characters of a token ever reach the logs.
const TOKEN_LOG_PREFIX: usize = 8;

/// Per-call knobs for [`ApiClient::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the default headers; these win on collision.
    pub headers: HeaderMap,
    /// Already JSON-encoded.
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn put(body: impl Into<String>) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Gateway to the admin panel backend.
///
/// Every call goes to `base_url + endpoint`. The bearer token is looked up in
/// the shared token storage at send time, so a login or logout performed by
/// the auth store is picked up by the very next request. The client never
/// writes to the storage.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    storage: Arc<dyn TokenStorage>,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            storage,
        }
    }

    pub fn from_config(
        config: &ApiConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        Self::new(config.base_url.clone(), transport, storage)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and decode the JSON answer.
    ///
    /// A 2xx with an empty body resolves to `{}`. A 2xx whose body is not JSON
    /// is a [`ApiError::Parse`]. Any other status becomes [`ApiError::Http`]
    /// carrying the server's `detail`, or `HTTP error! status: <code>` when
    /// there is none. Transport failures are passed through untouched.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let headers = self.build_headers(endpoint, options.headers)?;
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(
            event_name = "api.request.send",
            event_domain = "api",
            method = %options.method,
            url = url.as_str(),
            headers = ?headers,
            "sending API request"
        );

        let request = ApiRequest {
            method: options.method,
            url,
            headers,
            body: options.body,
        };
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    event_name = "api.request.failed",
                    event_domain = "api",
                    endpoint,
                    transport = self.transport.get_name(),
                    "API request failed: {}",
                    e
                );
                return Err(ApiError::Transport(e));
            }
        };

        debug!(
            event_name = "api.response.received",
            event_domain = "api",
            endpoint,
            status = response.status.as_u16(),
            "received API response"
        );

        if !response.status.is_success() {
            let err = http_error(response.status, &response.body);
            warn!(
                event_name = "api.response.error",
                event_domain = "api",
                endpoint,
                status = response.status.as_u16(),
                "API returned an error: {}",
                err
            );
            return Err(err);
        }

        parse_success_body(&response.body)
    }

    fn build_headers(&self, endpoint: &str, caller: HeaderMap) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        // Extend replaces existing values for every key the caller supplies.
        headers.extend(caller);

        if !sends_credentials(endpoint) {
            return Ok(headers);
        }

        match self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) {
            Some(token) => {
                debug!(
                    "Sending request with token: {}...",
                    token.chars().take(TOKEN_LOG_PREFIX).collect::<String>()
                );
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            None => debug!("No token found in {} storage", self.storage.get_name()),
        }
        Ok(headers)
    }
}

/// Signup and login are the only calls made without a bearer token.
fn sends_credentials(endpoint: &str) -> bool {
    !endpoint.contains(LOGIN_PATH) && !endpoint.contains(SIGNUP_PATH)
}

fn http_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    ApiError::Http { status, message }
}

fn parse_success_body(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::storage::MemoryStorage;
    use crate::transport::ApiResponse;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every request and answers with a canned response.
    pub(crate) struct RecordingTransport {
        pub requests: Mutex<Vec<ApiRequest>>,
        response: Result<ApiResponse, String>,
    }

    impl RecordingTransport {
        pub fn answering(status: StatusCode, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(ApiResponse::new(status, body)),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            })
        }

        pub fn last(&self) -> ApiRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for RecordingTransport {
        fn get_name(&self) -> &str {
            "recording"
        }

        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, BoxError> {
            self.requests.lock().unwrap().push(request);
            self.response.clone().map_err(BoxError::from)
        }
    }

    fn client(transport: Arc<RecordingTransport>, token: Option<&str>) -> ApiClient {
        let storage = match token {
            Some(token) => MemoryStorage::with_entry(TOKEN_KEY, token),
            None => MemoryStorage::new(),
        };
        ApiClient::new("http://backend.test/", transport, Arc::new(storage))
    }

    #[tokio::test]
    async fn test_auth_endpoints_never_send_authorization() {
        for endpoint in [LOGIN_PATH, SIGNUP_PATH] {
            let transport = RecordingTransport::answering(StatusCode::OK, "{}");
            let api = client(transport.clone(), Some("stored-token"));

            api.request(endpoint, RequestOptions::post("{}")).await.unwrap();

            let sent = transport.last();
            assert!(sent.headers.get(AUTHORIZATION).is_none(), "{endpoint}");
            assert_eq!(sent.url, format!("http://backend.test{endpoint}"));
        }
    }

    #[tokio::test]
    async fn test_other_endpoints_send_bearer_token() {
        let transport = RecordingTransport::answering(StatusCode::OK, "{}");
        let api = client(transport.clone(), Some("tok1"));

        api.request("/admin/users", RequestOptions::get()).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.method, Method::GET);
        assert_eq!(sent.headers.get(AUTHORIZATION).unwrap(), "Bearer tok1");
        assert!(sent.headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(sent.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_no_token_no_authorization() {
        let transport = RecordingTransport::answering(StatusCode::OK, "{}");
        let api = client(transport.clone(), None);

        api.request("/auth/me", RequestOptions::get()).await.unwrap();
        assert!(transport.last().headers.get(AUTHORIZATION).is_none());

        let transport = RecordingTransport::answering(StatusCode::OK, "{}");
        let api = client(transport.clone(), Some(""));
        api.request("/auth/me", RequestOptions::get()).await.unwrap();
        assert!(transport.last().headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_caller_headers_win_over_defaults() {
        let transport = RecordingTransport::answering(StatusCode::OK, "{}");
        let api = client(transport.clone(), None);

        let options = RequestOptions::post("{}")
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/merge-patch+json"))
            .with_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("42"),
            );
        api.request("/admin/users/1", options).await.unwrap();

        let sent = transport.last();
        assert_eq!(
            sent.headers.get(CONTENT_TYPE).unwrap(),
            "application/merge-patch+json"
        );
        assert_eq!(sent.headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(sent.headers.get("x-request-id").unwrap(), "42");
        assert_eq!(sent.body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_stored_token_overrides_caller_authorization() {
        let transport = RecordingTransport::answering(StatusCode::OK, "{}");
        let api = client(transport.clone(), Some("real"));

        let options = RequestOptions::get()
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer forged"));
        api.request("/auth/me", options).await.unwrap();

        assert_eq!(
            transport.last().headers.get(AUTHORIZATION).unwrap(),
            "Bearer real"
        );
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let transport = RecordingTransport::answering(StatusCode::OK, r#"{"total": 4}"#);
        let api = client(transport, None);
        let value = api.request("/admin/stats", RequestOptions::get()).await.unwrap();
        assert_eq!(value, json!({"total": 4}));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_empty_object() {
        let transport = RecordingTransport::answering(StatusCode::NO_CONTENT, "");
        let api = client(transport, None);
        let value = api.request("/admin/users/1", RequestOptions::delete()).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_unparsable_success_body_is_parse_error() {
        let transport = RecordingTransport::answering(StatusCode::OK, "<html>oops</html>");
        let api = client(transport, None);
        let err = api.request("/auth/me", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_error_detail_becomes_message() {
        let transport = RecordingTransport::answering(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Cannot delete yourself"}"#,
        );
        let api = client(transport, Some("tok"));
        let err = api.request("/admin/users/1", RequestOptions::delete()).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete yourself");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_unparsable_error_body_mentions_status() {
        let transport = RecordingTransport::answering(StatusCode::BAD_GATEWAY, "upstream down");
        let api = client(transport, None);
        let err = api.request("/auth/me", RequestOptions::get()).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 502");
    }

    #[tokio::test]
    async fn test_transport_failure_is_passed_through() {
        let transport = RecordingTransport::failing("connection refused");
        let api = client(transport.clone(), None);
        let err = api.request("/auth/me", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sends_credentials() {
        assert!(!sends_credentials("/auth/login"));
        assert!(!sends_credentials("/auth/signup"));
        assert!(sends_credentials("/auth/me"));
        assert!(sends_credentials("/admin/users/3"));
    }
}
