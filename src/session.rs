//! Session identities shared by the server and the client session context.
//!
//! A browser may hold a customer session and an admin session at the same
//! time. Each kind owns its own cookie, local-storage keys, protected path
//! prefix and entry page.

use serde::{Deserialize, Serialize};

/// Customer session cookie name
pub const USER_COOKIE: &str = "token";

/// Admin session cookie name
pub const ADMIN_COOKIE: &str = "admin_token";

/// Every cookie the portal itself issues. Logout expires exactly these.
pub const SESSION_COOKIES: [&str; 2] = [USER_COOKIE, ADMIN_COOKIE];

/// Customer sign-in page
pub const SIGN_IN_PATH: &str = "/signin";

/// Customer landing page after sign-in
pub const USER_DASHBOARD_PATH: &str = "/user/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    User,
    Admin,
}

impl SessionKind {
    pub const ALL: [SessionKind; 2] = [SessionKind::User, SessionKind::Admin];

    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionKind::User => USER_COOKIE,
            SessionKind::Admin => ADMIN_COOKIE,
        }
    }

    /// Local-storage key holding the identity projection
    pub fn identity_key(&self) -> &'static str {
        match self {
            SessionKind::User => "user",
            SessionKind::Admin => "admin",
        }
    }

    /// Local-storage key holding the bearer token mirror
    pub fn token_key(&self) -> &'static str {
        match self {
            SessionKind::User => "userToken",
            SessionKind::Admin => "adminToken",
        }
    }

    pub fn protected_prefix(&self) -> &'static str {
        match self {
            SessionKind::User => "/user",
            SessionKind::Admin => "/admin",
        }
    }

    pub fn entry_path(&self) -> &'static str {
        match self {
            SessionKind::User => SIGN_IN_PATH,
            SessionKind::Admin => "/auth/admin-login",
        }
    }

    pub fn landing_path(&self) -> &'static str {
        match self {
            SessionKind::User => USER_DASHBOARD_PATH,
            SessionKind::Admin => "/admin/dashboard",
        }
    }

    /// Portal endpoint that drops this session's cookie
    pub fn logout_endpoint(&self) -> &'static str {
        match self {
            SessionKind::User => "/api/logout",
            SessionKind::Admin => "/api/admin/logout",
        }
    }

    /// Portal endpoint that re-validates this session against the backend
    pub fn introspection_endpoint(&self) -> &'static str {
        match self {
            SessionKind::User => "/api/login",
            SessionKind::Admin => "/api/admin/login",
        }
    }

    /// Whether `path` lies under this kind's protected area
    pub fn protects(&self, path: &str) -> bool {
        path_has_prefix(path, self.protected_prefix())
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::User => write!(f, "user"),
            SessionKind::Admin => write!(f, "admin"),
        }
    }
}

/// Plain string prefix match, the same test the edge gate applies.
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    path.starts_with(prefix)
}
