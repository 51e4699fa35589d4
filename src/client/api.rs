//! HTTP client for the portal's own `/api` surface.
//!
//! Replies are parsed whatever the status code: failures carry the same
//! `{success, message}` envelope as successes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{multipart, Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::api::UPLOAD_FIELD;
use crate::backend::{CustomerQuery, Upload};
use crate::models::{
    AdminLoginReply, AdminStatusReply, CustomerLoginReply, MessageReply, ProfileReply,
    ScratchCardsReply, ScreenshotsReply, UploadReply,
};
use crate::session::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Scratch,
    Redeem,
}

impl CardAction {
    fn segment(&self) -> &'static str {
        match self {
            CardAction::Scratch => "scratch",
            CardAction::Redeem => "redeem",
        }
    }
}

/// Portal endpoints plus the cookie jar that carries the session cookies
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `POST /api/login`; without an OTP this only requests one
    async fn login(&self, phone: &str, otp: Option<&str>) -> Result<CustomerLoginReply>;
    async fn user_status(&self) -> Result<ProfileReply>;
    async fn admin_login(&self, email: &str, password: &str) -> Result<AdminLoginReply>;
    async fn admin_status(&self) -> Result<AdminStatusReply>;
    async fn logout(&self, kind: SessionKind) -> Result<MessageReply>;
    async fn scratch_cards(&self) -> Result<ScratchCardsReply>;
    async fn card_action(&self, id: &str, action: CardAction) -> Result<MessageReply>;
    async fn screenshots(&self) -> Result<ScreenshotsReply>;
    async fn upload_screenshot(&self, upload: Upload) -> Result<UploadReply>;
    async fn delete_screenshot(&self, id: &str) -> Result<MessageReply>;
    async fn customers(&self, query: &CustomerQuery) -> Result<Value>;

    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&self, name: &str, value: &str);
    fn expire_cookie(&self, name: &str);
}

pub struct HttpPortalApi {
    base_url: Url,
    client: Client,
    jar: Arc<Jar>,
}

impl HttpPortalApi {
    pub fn new(portal_url: &str) -> Result<Self> {
        let base_url = Url::parse(portal_url)
            .with_context(|| format!("Invalid portal URL: {}", portal_url))?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .cookie_provider(jar.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            client,
            jar,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid portal path: {}", path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .context("Failed to connect to portal. Is it running?")?;
        let status = response.status();
        let bytes = response.bytes().await.context("Failed to read portal reply")?;

        serde_json::from_slice(&bytes)
            .with_context(|| format!("Unexpected portal reply ({})", status))
    }
}

/// Value of `name` in a `Cookie` header
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn login(&self, phone: &str, otp: Option<&str>) -> Result<CustomerLoginReply> {
        let body = match otp {
            Some(otp) => json!({ "phone": phone, "otp": otp }),
            None => json!({ "phone": phone }),
        };
        self.send(self.client.post(self.url("/api/login")?).json(&body))
            .await
    }

    async fn user_status(&self) -> Result<ProfileReply> {
        let path = SessionKind::User.introspection_endpoint();
        self.send(self.client.get(self.url(path)?)).await
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<AdminLoginReply> {
        let body = json!({ "email": email, "password": password });
        self.send(self.client.post(self.url("/api/admin/login")?).json(&body))
            .await
    }

    async fn admin_status(&self) -> Result<AdminStatusReply> {
        let path = SessionKind::Admin.introspection_endpoint();
        self.send(self.client.get(self.url(path)?)).await
    }

    async fn logout(&self, kind: SessionKind) -> Result<MessageReply> {
        self.send(self.client.post(self.url(kind.logout_endpoint())?))
            .await
    }

    async fn scratch_cards(&self) -> Result<ScratchCardsReply> {
        self.send(self.client.get(self.url("/api/scratch-cards")?)).await
    }

    async fn card_action(&self, id: &str, action: CardAction) -> Result<MessageReply> {
        let path = format!(
            "/api/scratch-cards/{}/{}",
            urlencoding::encode(id),
            action.segment()
        );
        self.send(self.client.post(self.url(&path)?)).await
    }

    async fn screenshots(&self) -> Result<ScreenshotsReply> {
        self.send(self.client.get(self.url("/api/screenshots")?)).await
    }

    async fn upload_screenshot(&self, upload: Upload) -> Result<UploadReply> {
        let mut part = multipart::Part::bytes(upload.bytes.to_vec()).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type {
            part = part
                .mime_str(&content_type)
                .context("Invalid screenshot content type")?;
        }
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        self.send(self.client.post(self.url("/api/screenshots")?).multipart(form))
            .await
    }

    async fn delete_screenshot(&self, id: &str) -> Result<MessageReply> {
        let path = format!("/api/screenshots/{}", urlencoding::encode(id));
        self.send(self.client.delete(self.url(&path)?)).await
    }

    async fn customers(&self, query: &CustomerQuery) -> Result<Value> {
        let request = self
            .client
            .get(self.url("/api/admin/customers/list")?)
            .query(&[
                ("page", query.page.as_str()),
                ("perPage", query.per_page.as_str()),
                ("filter", query.filter.as_str()),
            ]);
        self.send(request).await
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        find_cookie(header.to_str().ok()?, name)
    }

    fn set_cookie(&self, name: &str, value: &str) {
        self.jar
            .add_cookie_str(&format!("{}={}; Path=/", name, value), &self.base_url);
    }

    fn expire_cookie(&self, name: &str) {
        self.jar
            .add_cookie_str(&format!("{}=; Max-Age=0; Path=/", name), &self.base_url);
    }
}
