//! Recording [`Backend`] double for handler tests.

use async_trait::async_trait;
use axum::http::StatusCode;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{
    Ack, AdminProfile, Backend, BackendError, BackendResult, ClientProfile, CouponList,
    CustomerQuery, Reply, ScreenshotList, ScreenshotUpload, TokenGrant, Upload,
};
use crate::config::Config;
use crate::AppState;

/// One recorded backend call: operation name plus the bearer token used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub token: Option<String>,
    pub arg: Option<String>,
}

/// Canned replies. Anything left at its default answers with a successful,
/// empty body.
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<Call>>,
    pub send_otp: Mutex<Option<Reply<Ack>>>,
    pub validate_otp: Mutex<Option<Reply<TokenGrant>>>,
    pub client_profile: Mutex<Option<Reply<ClientProfile>>>,
    pub admin_login: Mutex<Option<Reply<TokenGrant>>>,
    pub admin_profile: Mutex<Option<Reply<AdminProfile>>>,
    pub coupons: Mutex<Option<Reply<CouponList>>>,
    pub coupon_action: Mutex<Option<Reply<Ack>>>,
    pub screenshots: Mutex<Option<Reply<ScreenshotList>>>,
    pub upload: Mutex<Option<Reply<ScreenshotUpload>>>,
    pub delete: Mutex<Option<Reply<Ack>>>,
    pub customers: Mutex<Option<Reply<Value>>>,
    pub last_upload: Mutex<Option<Upload>>,
    pub last_query: Mutex<Option<CustomerQuery>>,
    /// When set, every call fails with a decode error
    pub broken: Mutex<bool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(|c| c.op).collect()
    }

    fn record(&self, op: &'static str, token: Option<&str>, arg: Option<&str>) -> BackendResult<()> {
        self.calls.lock().push(Call {
            op,
            token: token.map(str::to_string),
            arg: arg.map(str::to_string),
        });
        if *self.broken.lock() {
            let err = serde_json::from_str::<Value>("<html>").unwrap_err();
            return Err(BackendError::Decode(err));
        }
        Ok(())
    }
}

fn canned<T: Clone>(slot: &Mutex<Option<Reply<T>>>, fallback: T) -> Reply<T> {
    slot.lock().clone().unwrap_or_else(|| Reply::ok(fallback))
}

fn success_ack() -> Ack {
    Ack {
        success: true,
        ..Ack::default()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn send_otp(&self, phone: &str) -> BackendResult<Reply<Ack>> {
        self.record("send_otp", None, Some(phone))?;
        Ok(canned(&self.send_otp, success_ack()))
    }

    async fn validate_otp(&self, phone: &str, otp: &str) -> BackendResult<Reply<TokenGrant>> {
        self.record("validate_otp", None, Some(&format!("{}:{}", phone, otp)))?;
        Ok(canned(
            &self.validate_otp,
            TokenGrant {
                success: true,
                jwt_token: Some("jwt-user".to_string()),
                ..TokenGrant::default()
            },
        ))
    }

    async fn client_profile(&self, token: &str) -> BackendResult<Reply<ClientProfile>> {
        self.record("client_profile", Some(token), None)?;
        let client = serde_json::from_value(json!({
            "_id": "c1",
            "phone": "9999999999",
            "customer": "Asha",
            "settlement": {"$numberDecimal": "12.34"}
        }))?;
        Ok(canned(
            &self.client_profile,
            ClientProfile {
                success: true,
                message: None,
                client: Some(client),
            },
        ))
    }

    async fn admin_login(&self, email: &str, _password: &str) -> BackendResult<Reply<TokenGrant>> {
        self.record("admin_login", None, Some(email))?;
        Ok(canned(
            &self.admin_login,
            TokenGrant {
                success: true,
                jwt_token: Some("jwt-admin".to_string()),
                email: Some(email.to_string()),
                name: Some("Ops".to_string()),
                ..TokenGrant::default()
            },
        ))
    }

    async fn admin_profile(&self, token: &str) -> BackendResult<Reply<AdminProfile>> {
        self.record("admin_profile", Some(token), None)?;
        Ok(canned(
            &self.admin_profile,
            AdminProfile {
                success: true,
                message: None,
                email: Some("ops@repaykaro.in".to_string()),
                name: Some("Ops".to_string()),
            },
        ))
    }

    async fn coupons(&self, token: &str) -> BackendResult<Reply<CouponList>> {
        self.record("coupons", Some(token), None)?;
        Ok(canned(
            &self.coupons,
            CouponList {
                success: true,
                ..CouponList::default()
            },
        ))
    }

    async fn scratch_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        self.record("scratch_coupon", Some(token), Some(id))?;
        Ok(canned(&self.coupon_action, success_ack()))
    }

    async fn redeem_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        self.record("redeem_coupon", Some(token), Some(id))?;
        Ok(canned(&self.coupon_action, success_ack()))
    }

    async fn screenshots(&self, token: &str) -> BackendResult<Reply<ScreenshotList>> {
        self.record("screenshots", Some(token), None)?;
        Ok(canned(
            &self.screenshots,
            ScreenshotList {
                success: true,
                ..ScreenshotList::default()
            },
        ))
    }

    async fn upload_screenshot(
        &self,
        token: &str,
        upload: Upload,
    ) -> BackendResult<Reply<ScreenshotUpload>> {
        self.record("upload_screenshot", Some(token), Some(&upload.file_name))?;
        *self.last_upload.lock() = Some(upload);
        Ok(canned(
            &self.upload,
            ScreenshotUpload {
                success: true,
                ..ScreenshotUpload::default()
            },
        ))
    }

    async fn delete_screenshot(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        self.record("delete_screenshot", Some(token), Some(id))?;
        Ok(canned(&self.delete, success_ack()))
    }

    async fn customers(&self, token: &str, query: &CustomerQuery) -> BackendResult<Reply<Value>> {
        self.record("customers", Some(token), None)?;
        *self.last_query.lock() = Some(query.clone());
        Ok(canned(
            &self.customers,
            json!({"success": true, "data": [], "totalRecords": 0}),
        ))
    }
}

/// Set a canned reply with an explicit status
pub fn reply<T>(status: StatusCode, body: T) -> Option<Reply<T>> {
    Some(Reply::new(status, body))
}

/// App state wired to the given mock
pub fn state_with(backend: Arc<MockBackend>) -> Arc<AppState> {
    Arc::new(AppState::new(Config::default(), backend))
}
