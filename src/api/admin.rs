//! Admin email/password sign-in and the admin customer list.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::cookies::{expired_cookie, session_cookie, AdminToken};
use super::error::{backend_message, ApiError};
use crate::backend::CustomerQuery;
use crate::models::{Admin, AdminLoginReply, AdminStatusReply, AdminSummary, MessageReply};
use crate::session::SessionKind;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<AdminLoginReply>), ApiError> {
    let request: AdminLoginRequest = serde_json::from_slice(&body)?;

    let reply = state
        .backend
        .admin_login(&request.email, &request.password)
        .await?;
    let Some(token) = reply.body.token().map(str::to_string) else {
        warn!(status = %reply.status, "Admin login rejected");
        return Err(ApiError::rejected(backend_message(
            reply.body.message,
            "Login failed",
        )));
    };

    let jar = jar.add(session_cookie(
        SessionKind::Admin,
        token.clone(),
        &state.config.session,
    ));
    info!(email = %request.email, "Admin signed in");

    Ok((
        jar,
        Json(AdminLoginReply {
            success: true,
            message: Some("Login successful".to_string()),
            user: Some(AdminSummary {
                email: reply.body.email.unwrap_or(request.email),
                name: reply.body.name.unwrap_or_default(),
                admin_token: token,
            }),
        }),
    ))
}

/// Current admin, confirmed with the backend
///
/// GET /api/admin/login
pub async fn current_admin(
    State(state): State<Arc<AppState>>,
    AdminToken(token): AdminToken,
) -> Result<Json<AdminStatusReply>, ApiError> {
    let reply = state.backend.admin_profile(&token).await?;
    if !reply.is_success() || !reply.body.success {
        return Err(ApiError::rejected("Failed to fetch admin info"));
    }

    Ok(Json(AdminStatusReply {
        success: true,
        message: None,
        is_admin: true,
        admin: Some(Admin {
            email: reply.body.email.unwrap_or_default(),
            name: reply.body.name.unwrap_or_default(),
        }),
    }))
}

/// POST /api/admin/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageReply>) {
    (
        jar.add(expired_cookie(SessionKind::Admin)),
        Json(MessageReply::ok("Logged out successfully")),
    )
}

/// Raw query; empty values fall back to the list defaults
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListParams {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub filter: Option<String>,
}

impl CustomerListParams {
    pub fn into_query(self) -> CustomerQuery {
        let defaults = CustomerQuery::default();
        let pick = |value: Option<String>, default: String| {
            value.filter(|v| !v.trim().is_empty()).unwrap_or(default)
        };

        CustomerQuery {
            page: pick(self.page, defaults.page),
            per_page: pick(self.per_page, defaults.per_page),
            filter: pick(self.filter, defaults.filter),
        }
    }
}

/// Paged customer list, passed through from the backend
///
/// GET /api/admin/customers/list?page&perPage&filter
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    AdminToken(token): AdminToken,
    Query(params): Query<CustomerListParams>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let query = params.into_query();
    let reply = state.backend.customers(&token, &query).await?;
    if !reply.is_success() {
        warn!(status = %reply.status, page = %query.page, "Customer list failed");
        return Err(ApiError::internal("Failed to fetch customers"));
    }

    Ok((StatusCode::OK, Json(reply.body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_json, get, post_json, set_cookies};
    use crate::backend::mock::{reply, state_with, MockBackend};
    use crate::backend::{AdminProfile, TokenGrant};
    use serde_json::json;

    #[tokio::test]
    async fn test_admin_login_sets_admin_cookie() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let response = post_json(
            &state,
            "/api/admin/login",
            json!({"email": "ops@repaykaro.in", "password": "secret"}),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("admin_token=jwt-admin"));
        assert!(cookies[0].contains("HttpOnly"));

        let body = body_json(response).await;
        assert_eq!(
            body["user"],
            json!({"email": "ops@repaykaro.in", "name": "Ops", "adminToken": "jwt-admin"})
        );
    }

    #[tokio::test]
    async fn test_admin_login_rejected_is_401_without_cookie() {
        let backend = Arc::new(MockBackend::new());
        *backend.admin_login.lock() = reply(
            StatusCode::UNAUTHORIZED,
            TokenGrant {
                success: false,
                message: Some("Invalid credentials".into()),
                ..TokenGrant::default()
            },
        );
        let state = state_with(backend);

        let response = post_json(
            &state,
            "/api/admin/login",
            json!({"email": "ops@repaykaro.in", "password": "wrong"}),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response).is_empty());
        assert_eq!(
            body_json(response).await["message"],
            json!("Invalid credentials")
        );
    }

    #[tokio::test]
    async fn test_admin_login_without_token_uses_default_message() {
        let backend = Arc::new(MockBackend::new());
        *backend.admin_login.lock() = reply(
            StatusCode::OK,
            TokenGrant {
                success: true,
                ..TokenGrant::default()
            },
        );
        let state = state_with(backend);

        let response = post_json(&state, "/api/admin/login", json!({}), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], json!("Login failed"));
    }

    #[tokio::test]
    async fn test_current_admin() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let response = get(&state, "/api/admin/login", Some("admin_token=jwt-admin")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": true,
                "isAdmin": true,
                "admin": {"email": "ops@repaykaro.in", "name": "Ops"}
            })
        );
        assert_eq!(backend.calls()[0].token.as_deref(), Some("jwt-admin"));
    }

    #[tokio::test]
    async fn test_current_admin_ignores_customer_cookie() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let response = get(&state, "/api/admin/login", Some("token=jwt-user")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(backend.ops().is_empty());
    }

    #[tokio::test]
    async fn test_current_admin_backend_reject() {
        let backend = Arc::new(MockBackend::new());
        *backend.admin_profile.lock() = reply(StatusCode::UNAUTHORIZED, AdminProfile::default());
        let state = state_with(backend);

        let response = get(&state, "/api/admin/login", Some("admin_token=stale")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            json!("Failed to fetch admin info")
        );
    }

    #[tokio::test]
    async fn test_customer_list_forwards_defaults() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let response = get(
            &state,
            "/api/admin/customers/list?page=&filter=",
            Some("admin_token=jwt-admin"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "data": [], "totalRecords": 0})
        );
        assert_eq!(
            backend.last_query.lock().clone(),
            Some(CustomerQuery::default())
        );
    }

    #[tokio::test]
    async fn test_customer_list_forwards_query_verbatim() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let _ = get(
            &state,
            "/api/admin/customers/list?page=3&perPage=25&filter=1",
            Some("admin_token=jwt-admin"),
        )
        .await;
        let query = backend.last_query.lock().clone().unwrap();
        assert_eq!(query.page, "3");
        assert_eq!(query.per_page, "25");
        assert_eq!(query.filter, "1");
    }

    #[tokio::test]
    async fn test_customer_list_backend_failure_is_500() {
        let backend = Arc::new(MockBackend::new());
        *backend.customers.lock() = reply(StatusCode::BAD_GATEWAY, json!({"error": "down"}));
        let state = state_with(backend);

        let response = get(
            &state,
            "/api/admin/customers/list",
            Some("admin_token=jwt-admin"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "message": "Failed to fetch customers"})
        );
    }

    #[tokio::test]
    async fn test_customer_list_requires_admin_cookie() {
        let backend = Arc::new(MockBackend::new());
        let state = state_with(backend.clone());

        let response = get(&state, "/api/admin/customers/list", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(backend.ops().is_empty());
    }

    #[tokio::test]
    async fn test_admin_logout_keeps_customer_cookie() {
        let state = state_with(Arc::new(MockBackend::new()));

        let response = post_json(
            &state,
            "/api/admin/logout",
            json!({}),
            Some("token=jwt-user; admin_token=jwt-admin"),
        )
        .await;
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("admin_token="));
    }
}
