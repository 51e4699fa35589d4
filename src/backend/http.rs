//! reqwest implementation of [`Backend`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    Ack, AdminProfile, Backend, BackendError, BackendResult, ClientProfile, CouponList,
    CustomerQuery, Reply, ScreenshotList, ScreenshotUpload, TokenGrant, Upload,
};
use crate::config::BackendConfig;

/// HTTP client for the external backend API.
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create backend HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send once, decode the JSON body whatever the status.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<Reply<T>> {
        let response = request.send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.bytes().await?;
        debug!(status = %status, len = bytes.len(), "Backend response received");

        let body = serde_json::from_slice(&bytes)?;
        Ok(Reply::new(status, body))
    }

    fn authed_get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    fn authed_post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }
}

fn id_path(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(id))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send_otp(&self, phone: &str) -> BackendResult<Reply<Ack>> {
        let request = self
            .client
            .post(self.url("/clientAuth/login"))
            .json(&json!({ "phone": phone }));
        self.send(request).await
    }

    async fn validate_otp(&self, phone: &str, otp: &str) -> BackendResult<Reply<TokenGrant>> {
        let request = self
            .client
            .post(self.url("/clientAuth/validate-otp"))
            .json(&json!({ "phone": phone, "otp": otp }));
        self.send(request).await
    }

    async fn client_profile(&self, token: &str) -> BackendResult<Reply<ClientProfile>> {
        self.send(self.authed_get("/clients/get-client", token)).await
    }

    async fn admin_login(&self, email: &str, password: &str) -> BackendResult<Reply<TokenGrant>> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        self.send(request).await
    }

    async fn admin_profile(&self, token: &str) -> BackendResult<Reply<AdminProfile>> {
        self.send(self.authed_get("/auth/profile", token)).await
    }

    async fn coupons(&self, token: &str) -> BackendResult<Reply<CouponList>> {
        self.send(self.authed_get("/clients/get-coupon", token)).await
    }

    async fn scratch_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        let path = id_path("/clients/scratch-coupon", id);
        self.send(self.authed_post(&path, token)).await
    }

    async fn redeem_coupon(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        let path = id_path("/clients/redeem-coupon", id);
        self.send(self.authed_post(&path, token)).await
    }

    async fn screenshots(&self, token: &str) -> BackendResult<Reply<ScreenshotList>> {
        self.send(self.authed_get("/clients/get-screenshots", token)).await
    }

    async fn upload_screenshot(
        &self,
        token: &str,
        upload: Upload,
    ) -> BackendResult<Reply<ScreenshotUpload>> {
        let mut part = multipart::Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| BackendError::Multipart(e.to_string()))?;
        }
        let form = multipart::Form::new().part("screenshot", part);

        let request = self
            .authed_post("/clients/upload-screenshot", token)
            .multipart(form);
        self.send(request).await
    }

    async fn delete_screenshot(&self, token: &str, id: &str) -> BackendResult<Reply<Ack>> {
        let path = id_path("/clients/delete-screenshot", id);
        let request = self.client.delete(self.url(&path)).bearer_auth(token);
        self.send(request).await
    }

    async fn customers(&self, token: &str, query: &CustomerQuery) -> BackendResult<Reply<Value>> {
        let request = self.authed_get("/customers/list", token).query(&[
            ("page", query.page.as_str()),
            ("perPage", query.per_page.as_str()),
            ("filter", query.filter.as_str()),
        ]);
        self.send(request).await
    }
}
