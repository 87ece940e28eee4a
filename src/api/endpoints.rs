use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::client::{ApiClient, RequestOptions, LOGIN_PATH, SIGNUP_PATH};
use crate::error::ApiError;
use crate::models::{
    AdminStats, DeleteUserResponse, LoginRequest, SignupRequest, TokenResponse, User, UserUpdate,
};

const ME_PATH: &str = "/auth/me";
const USERS_PATH: &str = "/admin/users";
const STATS_PATH: &str = "/admin/stats";

fn user_path(user_id: i64) -> String {
    format!("{USERS_PATH}/{user_id}")
}

fn encode<T: Serialize>(body: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string(body)?)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

impl ApiClient {
    /// Register a new account. Accounts other than the very first one start unapproved.
    pub async fn signup(&self, data: &SignupRequest) -> Result<User, ApiError> {
        let value = self
            .request(SIGNUP_PATH, RequestOptions::post(encode(data)?))
            .await?;
        decode(value)
    }

    /// Exchange credentials for a bearer token. Does not touch the auth store.
    pub async fn login(&self, data: &LoginRequest) -> Result<TokenResponse, ApiError> {
        let value = self
            .request(LOGIN_PATH, RequestOptions::post(encode(data)?))
            .await?;
        decode(value)
    }

    pub async fn get_me(&self) -> Result<User, ApiError> {
        decode(self.request(ME_PATH, RequestOptions::get()).await?)
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, ApiError> {
        decode(self.request(USERS_PATH, RequestOptions::get()).await?)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, ApiError> {
        decode(self.request(&user_path(user_id), RequestOptions::get()).await?)
    }

    pub async fn update_user(&self, user_id: i64, data: &UserUpdate) -> Result<User, ApiError> {
        let value = self
            .request(&user_path(user_id), RequestOptions::put(encode(data)?))
            .await?;
        decode(value)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<DeleteUserResponse, ApiError> {
        decode(self.request(&user_path(user_id), RequestOptions::delete()).await?)
    }

    pub async fn get_admin_stats(&self) -> Result<AdminStats, ApiError> {
        decode(self.request(STATS_PATH, RequestOptions::get()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::RecordingTransport;
    use crate::models::Role;
    use crate::storage::{MemoryStorage, TOKEN_KEY};
    use http::header::AUTHORIZATION;
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    const USER_JSON: &str = r#"{
        "id": 2,
        "email": "grace@example.org",
        "full_name": "Grace Hopper",
        "role": "student",
        "is_approved": true,
        "is_active": true,
        "created_at": "2024-01-02T03:04:05"
    }"#;

    fn client(transport: Arc<RecordingTransport>) -> ApiClient {
        let storage = MemoryStorage::with_entry(TOKEN_KEY, "tok");
        ApiClient::new("http://backend.test", transport, Arc::new(storage))
    }

    fn sent_json(transport: &RecordingTransport) -> Value {
        serde_json::from_str(transport.last().body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_user_path() {
        assert_eq!(user_path(17), "/admin/users/17");
    }

    #[tokio::test]
    async fn test_signup_posts_credentials_without_token() {
        let transport = RecordingTransport::answering(StatusCode::OK, USER_JSON);
        let data = SignupRequest {
            email: "grace@example.org".to_string(),
            password: "hunter2".to_string(),
            full_name: "Grace Hopper".to_string(),
            role: Role::Student,
        };

        let user = client(transport.clone()).signup(&data).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.url, "http://backend.test/auth/signup");
        assert!(sent.headers.get(AUTHORIZATION).is_none());
        assert_eq!(sent_json(&transport)["role"], json!("student"));
        assert_eq!(user.email, "grace@example.org");
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let transport = RecordingTransport::answering(
            StatusCode::OK,
            r#"{"access_token": "jwt", "token_type": "bearer", "role": "admin", "is_approved": true}"#,
        );
        let data = LoginRequest {
            email: "root@example.org".to_string(),
            password: "pw".to_string(),
        };

        let token = client(transport.clone()).login(&data).await.unwrap();

        assert_eq!(token.access_token, "jwt");
        assert!(transport.last().headers.get(AUTHORIZATION).is_none());
        assert_eq!(
            sent_json(&transport),
            json!({"email": "root@example.org", "password": "pw"})
        );
    }

    #[tokio::test]
    async fn test_get_me_sends_token() {
        let transport = RecordingTransport::answering(StatusCode::OK, USER_JSON);
        let me = client(transport.clone()).get_me().await.unwrap();
        let sent = transport.last();
        assert_eq!(sent.url, "http://backend.test/auth/me");
        assert_eq!(sent.headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(me.id, 2);
    }

    #[tokio::test]
    async fn test_get_all_users() {
        let body = format!("[{USER_JSON}, {USER_JSON}]");
        let transport = RecordingTransport::answering(StatusCode::OK, &body);
        let users = client(transport.clone()).get_all_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(transport.last().url, "http://backend.test/admin/users");
    }

    #[tokio::test]
    async fn test_get_all_users_tolerates_unknown_roles() {
        let parent = USER_JSON.replace(r#""role": "student""#, r#""role": "parent""#);
        let body = format!("[{USER_JSON}, {parent}]");
        let transport = RecordingTransport::answering(StatusCode::OK, &body);

        let users = client(transport).get_all_users().await.unwrap();

        assert_eq!(users[0].role, Role::Student);
        assert_eq!(users[1].role, Role::Other("parent".to_string()));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let transport =
            RecordingTransport::answering(StatusCode::NOT_FOUND, r#"{"detail": "User not found"}"#);
        let err = client(transport.clone()).get_user(99).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(transport.last().url, "http://backend.test/admin/users/99");
    }

    #[tokio::test]
    async fn test_update_user_puts_only_set_fields() {
        let transport = RecordingTransport::answering(StatusCode::OK, USER_JSON);
        let update = UserUpdate {
            role: Some(Role::Teacher),
            ..UserUpdate::default()
        };

        client(transport.clone()).update_user(2, &update).await.unwrap();

        let sent = transport.last();
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.url, "http://backend.test/admin/users/2");
        assert_eq!(sent_json(&transport), json!({"role": "teacher"}));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let transport = RecordingTransport::answering(
            StatusCode::OK,
            r#"{"message": "User deleted successfully", "deleted_user_id": 5}"#,
        );
        let deleted = client(transport.clone()).delete_user(5).await.unwrap();
        let sent = transport.last();
        assert_eq!(sent.method, Method::DELETE);
        assert!(sent.body.is_none());
        assert_eq!(deleted.deleted_user_id, 5);
    }

    #[tokio::test]
    async fn test_get_admin_stats() {
        let transport = RecordingTransport::answering(
            StatusCode::OK,
            r#"{"total": 10, "admins": 1, "teachers": 3, "students": 6, "pending": 2}"#,
        );
        let stats = client(transport).get_admin_stats().await.unwrap();
        assert_eq!(
            stats,
            AdminStats {
                total: 10,
                admins: 1,
                teachers: 3,
                students: 6,
                pending: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_parse_error() {
        let transport = RecordingTransport::answering(StatusCode::OK, r#"{"total": "many"}"#);
        let err = client(transport).get_admin_stats().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
