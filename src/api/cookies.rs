//! Session cookies and the extractors that require them.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::error::ApiError;
use crate::config::SessionConfig;
use crate::session::SessionKind;

/// Build the cookie that carries a freshly issued session token
pub fn session_cookie(kind: SessionKind, token: String, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((kind.cookie_name(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config.max_age_days))
        .build()
}

/// Removal cookie that expires the session cookie on the client, whether or
/// not the request carried it
pub fn expired_cookie(kind: SessionKind) -> Cookie<'static> {
    let mut cookie = Cookie::build((kind.cookie_name(), "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Non-empty cookie value, if present
pub fn session_token(jar: &CookieJar, kind: SessionKind) -> Option<String> {
    jar.get(kind.cookie_name())
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Customer bearer token taken from the `token` cookie; 401 when absent
#[derive(Debug, Clone)]
pub struct UserToken(pub String);

/// Admin bearer token taken from the `admin_token` cookie; 401 when absent
#[derive(Debug, Clone)]
pub struct AdminToken(pub String);

fn token_from_parts(parts: &Parts, kind: SessionKind) -> Result<String, ApiError> {
    let jar = CookieJar::from_headers(&parts.headers);
    session_token(&jar, kind).ok_or_else(|| {
        tracing::debug!(cookie = kind.cookie_name(), path = %parts.uri.path(), "Missing session cookie");
        ApiError::unauthorized()
    })
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for UserToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_parts(parts, SessionKind::User).map(UserToken)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_parts(parts, SessionKind::Admin).map(AdminToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(SessionKind::User, "abc".into(), &SessionConfig::default());
        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
    }

    #[test]
    fn test_expired_cookie_has_zero_max_age() {
        let cookie = expired_cookie(SessionKind::Admin);
        assert_eq!(cookie.name(), "admin_token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }

    #[test]
    fn test_empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=; admin_token=xyz"));
        let jar = CookieJar::from_headers(&headers);

        assert_eq!(session_token(&jar, SessionKind::User), None);
        assert_eq!(
            session_token(&jar, SessionKind::Admin),
            Some("xyz".to_string())
        );
    }
}
