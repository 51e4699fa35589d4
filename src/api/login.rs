//! Customer phone/OTP sign-in and session introspection.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::cookies::{expired_cookie, session_cookie, UserToken};
use super::error::{backend_message, ApiError};
use crate::backend::Backend;
use crate::models::{Customer, CustomerLoginReply, MessageReply, ProfileReply, UserSummary};
use crate::session::SessionKind;
use crate::AppState;

const LOGIN_FAILED: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub otp: Option<String>,
}

impl LoginRequest {
    /// OTP to verify; absent or empty means "send one"
    fn otp(&self) -> Option<&str> {
        self.otp.as_deref().filter(|o| !o.is_empty())
    }
}

/// A session that passed every stage and may now be handed to the browser
struct OpenedSession {
    token: String,
    profile: Customer,
}

/// Stage 1: exchange phone + OTP for a bearer token
async fn validate_stage(backend: &dyn Backend, phone: &str, otp: &str) -> Result<String, ApiError> {
    let reply = backend.validate_otp(phone, otp).await?;
    match reply.body.token() {
        Some(token) => Ok(token.to_string()),
        None => {
            warn!(status = %reply.status, "OTP validation rejected");
            Err(ApiError::rejected(backend_message(
                reply.body.message,
                "OTP validation failed",
            )))
        }
    }
}

/// Stage 2: fetch the customer with the token just issued
async fn profile_stage(backend: &dyn Backend, token: &str) -> Result<Customer, ApiError> {
    let reply = backend.client_profile(token).await?;
    if !reply.body.success {
        warn!(status = %reply.status, "Profile fetch after OTP validation failed");
        return Err(ApiError::internal("Failed to fetch user details"));
    }
    Ok(reply.body.client.unwrap_or_default())
}

/// Validate, then fetch profile. Either stage failing ends the pipeline
/// before any cookie exists.
async fn open_session(backend: &dyn Backend, phone: &str, otp: &str) -> Result<OpenedSession, ApiError> {
    let token = validate_stage(backend, phone, otp).await?;
    let profile = profile_stage(backend, &token).await?;
    Ok(OpenedSession { token, profile })
}

async fn send_otp(backend: &dyn Backend, phone: &str) -> Result<MessageReply, ApiError> {
    let reply = backend.send_otp(phone).await?;
    if !reply.is_success() || !reply.body.success {
        warn!(status = %reply.status, "OTP send rejected");
        return Err(ApiError::bad_request(backend_message(
            reply.body.message,
            "Failed to send OTP",
        )));
    }
    Ok(MessageReply::ok("OTP sent successfully"))
}

/// Map transport and decode failures to the login flow's generic message
fn generic_on_internal(err: ApiError) -> ApiError {
    if err.status() == StatusCode::INTERNAL_SERVER_ERROR && err.message() == super::error::INTERNAL {
        err.with_message(LOGIN_FAILED)
    } else {
        err
    }
}

/// Two-phase customer login
///
/// POST /api/login  `{phone}` sends an OTP, `{phone, otp}` signs in
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<CustomerLoginReply>), ApiError> {
    let request: LoginRequest = serde_json::from_slice(&body)
        .map_err(ApiError::from)
        .map_err(generic_on_internal)?;
    let backend = state.backend.as_ref();

    let Some(otp) = request.otp() else {
        let reply = send_otp(backend, &request.phone)
            .await
            .map_err(generic_on_internal)?;
        info!("OTP sent");
        return Ok((
            jar,
            Json(CustomerLoginReply {
                success: reply.success,
                message: reply.message,
                ..CustomerLoginReply::default()
            }),
        ));
    };

    let session = open_session(backend, &request.phone, otp)
        .await
        .map_err(generic_on_internal)?;

    let jar = jar.add(session_cookie(
        SessionKind::User,
        session.token.clone(),
        &state.config.session,
    ));
    info!(customer_id = %session.profile.id, "Customer signed in");

    Ok((
        jar,
        Json(CustomerLoginReply {
            success: true,
            message: Some("Login successful".to_string()),
            user: Some(UserSummary::new(request.phone, session.profile.customer)),
            token: Some(session.token),
        }),
    ))
}

/// Current customer, re-fetched from the backend on every call
///
/// GET /api/login
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    UserToken(token): UserToken,
) -> Result<Json<ProfileReply>, ApiError> {
    let reply = state.backend.client_profile(&token).await?;
    if !reply.body.success {
        return Err(ApiError::rejected("Failed to fetch user info"));
    }

    Ok(Json(ProfileReply {
        success: true,
        message: None,
        user: reply.body.client,
    }))
}

/// Drop the customer session cookie
///
/// POST /api/logout
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageReply>) {
    (
        jar.add(expired_cookie(SessionKind::User)),
        Json(MessageReply::ok("Logged out successfully")),
    )
}
