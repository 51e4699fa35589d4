//! External backend API.
//!
//! The portal owns no business data. Every handler reaches the backend
//! through the [`Backend`] trait so the HTTP client can be swapped for a
//! recording double in tests.

mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpBackend;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Customer, ScratchCard, Screenshot};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS)
    #[error("Backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Body was not the JSON shape we expected
    #[error("Backend returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Multipart body could not be assembled
    #[error("Invalid upload: {0}")]
    Multipart(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A decoded backend response together with its HTTP status
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub body: T,
}

impl<T> Reply<T> {
    pub fn new(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }

    pub fn ok(body: T) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Plain acknowledgement. `status` is the backend's own status hint, sent on
/// some failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
}

/// Response of both OTP validation and admin login
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenGrant {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "jwtToken", default)]
    pub jwt_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TokenGrant {
    /// Token issued on success; an empty token counts as no token.
    pub fn token(&self) -> Option<&str> {
        if !self.success {
            return None;
        }
        self.jwt_token.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub client: Option<Customer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub coupon: Vec<ScratchCard>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenshotList {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenshotUpload {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub screen_shot: Option<Screenshot>,
}

/// File received from the browser, forwarded as-is
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: bytes::Bytes,
}

/// Pagination and filter for the admin customer list, forwarded verbatim
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomerQuery {
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(rename = "perPage", default = "default_per_page")]
    pub per_page: String,
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_page() -> String {
    "1".to_string()
}

fn default_per_page() -> String {
    "10".to_string()
}

fn default_filter() -> String {
    "-1".to_string()
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
            filter: default_filter(),
        }
    }
}

/// Operations the portal performs against the backend.
///
/// Implementations attempt each call exactly once; no retries.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /clientAuth/login`
    async fn send_otp(&self, phone: &str) -> BackendResult<Reply<Ack>>;

    /// `POST /clientAuth/validate-otp`
    async fn validate_otp(&self, phone: &str, otp: &str) -> BackendResult<Reply<TokenGrant>>;

    /// `GET /clients/get-client`
    async fn client_profile(&self, token: &str) -> BackendResult<Reply<ClientProfile>>;

    /// `POST /auth/login`
    async fn admin_login(&self, email: &str, password: &str) -> BackendResult<Reply<TokenGrant>>;

    /// `GET /auth/profile`
    async fn admin_profile(&self, token: &str) -> BackendResult<Reply<AdminProfile>>;

    /// `GET /clients/get-coupon`
    async fn coupons(&self, token: &str) -> BackendResult<Reply<CouponList>>;

    /// `POST /clients/scratch-coupon/{id}`
    async fn scratch_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>>;

    /// `POST /clients/redeem-coupon/{id}`
    async fn redeem_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>>;

    /// `GET /clients/get-screenshots`
    async fn screenshots(&self, token: &str) -> BackendResult<Reply<ScreenshotList>>;

    /// `POST /clients/upload-screenshot`
    async fn upload_screenshot(
        &self,
        token: &str,
        upload: Upload,
    ) -> BackendResult<Reply<ScreenshotUpload>>;

    /// `DELETE /clients/delete-screenshot/{id}`
    async fn delete_screenshot(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>>;

    /// `GET /customers/list`; the body is passed through untouched
    async fn customers(&self, token: &str, query: &CustomerQuery) -> BackendResult<Reply<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_grant_requires_success_and_token() {
        let ok: TokenGrant =
            serde_json::from_value(json!({"success": true, "jwtToken": "abc"})).unwrap();
        assert_eq!(ok.token(), Some("abc"));

        let no_token: TokenGrant = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(no_token.token(), None);

        let empty: TokenGrant =
            serde_json::from_value(json!({"success": true, "jwtToken": ""})).unwrap();
        assert_eq!(empty.token(), None);

        let rejected: TokenGrant =
            serde_json::from_value(json!({"success": false, "jwtToken": "abc"})).unwrap();
        assert_eq!(rejected.token(), None);
    }

    #[test]
    fn test_customer_query_defaults() {
        let query: CustomerQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query, CustomerQuery::default());
        assert_eq!(query.page, "1");
        assert_eq!(query.per_page, "10");
        assert_eq!(query.filter, "-1");
    }
}
