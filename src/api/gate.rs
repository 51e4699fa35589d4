//! Edge request gate.
//!
//! Runs before page requests and decides, from the path and the presence of
//! the customer `token` cookie alone, whether to let the request through or
//! redirect it. No network calls and no token validation happen here: a
//! stale cookie is treated as a session until the backend rejects it.

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::cookies::session_token;
use crate::session::{SessionKind, SIGN_IN_PATH, USER_DASHBOARD_PATH};

/// Paths that send an already signed-in customer to the dashboard
const AUTH_ENTRY_PATHS: [&str; 2] = [SIGN_IN_PATH, "/auth/signin"];

/// First path segments the gate never looks at (static assets)
const ASSET_SEGMENTS: [&str; 2] = ["assets", "static"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

/// Whether the gate applies to this path at all
pub fn matches(path: &str) -> bool {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest == "favicon.ico" || rest.starts_with("api") {
        return false;
    }
    let first = rest.split('/').next().unwrap_or_default();
    !ASSET_SEGMENTS.contains(&first)
}

fn is_protected(path: &str) -> bool {
    SessionKind::ALL
        .iter()
        .any(|kind| kind.protects(path))
}

/// Decide the outcome for one request
pub fn evaluate(path: &str, has_token: bool) -> GateDecision {
    if has_token && AUTH_ENTRY_PATHS.contains(&path) {
        return GateDecision::Redirect(USER_DASHBOARD_PATH.to_string());
    }

    if !has_token && is_protected(path) {
        return GateDecision::Redirect(sign_in_url(path));
    }

    GateDecision::Allow
}

/// Sign-in URL carrying the original path as `callbackUrl`
pub fn sign_in_url(callback: &str) -> String {
    format!(
        "{}?callbackUrl={}",
        SIGN_IN_PATH,
        urlencoding::encode(callback)
    )
}

/// Middleware applying [`evaluate`] to every matching request
pub async fn edge_gate(jar: CookieJar, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !matches(&path) {
        return next.run(request).await;
    }

    let has_token = session_token(&jar, SessionKind::User).is_some();
    match evaluate(&path, has_token) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(to) => {
            debug!(path = %path, to = %to, "Edge gate redirect");
            Redirect::temporary(&to).into_response()
        }
    }
}
