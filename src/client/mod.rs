//! Client session context.
//!
//! [`PortalSession`] plays the part of the portal page: it holds the customer
//! and admin identities, mirrors them into a [`LocalStore`], and keeps them in
//! step with the server's view of the session cookies.

pub mod api;
pub mod otp;
pub mod pagination;
pub mod storage;

pub use api::{CardAction, HttpPortalApi, PortalApi};
pub use storage::{FileStore, LocalStore, MemoryStore};

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{Admin, AdminSummary, Customer, UserSummary};
use crate::session::{path_has_prefix, SessionKind, SESSION_COOKIES, SIGN_IN_PATH};

/// Delay before a focus-triggered revalidation runs
pub const FOCUS_DEBOUNCE: Duration = Duration::from_millis(300);

/// Signed-in customer as the page knows it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    pub phone: String,
    #[serde(default)]
    pub customer: Option<String>,
    /// Full record, present once the server has confirmed the session
    #[serde(skip)]
    pub profile: Option<Customer>,
}

impl UserIdentity {
    pub fn display_name(&self) -> &str {
        self.customer.as_deref().unwrap_or(&self.phone)
    }

    fn from_profile(profile: Customer) -> Self {
        Self {
            phone: profile.phone.clone(),
            customer: profile.customer.clone(),
            profile: Some(profile),
        }
    }
}

/// Result of a successful sign-in, tagged by kind
#[derive(Debug, Clone)]
pub enum LoginPayload {
    User { user: UserSummary, token: String },
    Admin(AdminSummary),
}

/// Outcome of one revalidation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthCheck {
    pub user_valid: bool,
    pub admin_valid: bool,
    /// Page to navigate to, if the current one no longer fits the session
    pub redirect: Option<String>,
}

/// Clears the in-flight flag however the guarded call ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct PortalSession {
    api: Arc<dyn PortalApi>,
    store: Arc<dyn LocalStore>,
    user: Mutex<Option<UserIdentity>>,
    admin: Mutex<Option<Admin>>,
    checking: AtomicBool,
}

impl PortalSession {
    pub fn new(api: Arc<dyn PortalApi>, store: Arc<dyn LocalStore>) -> Self {
        Self {
            api,
            store,
            user: Mutex::new(None),
            admin: Mutex::new(None),
            checking: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &dyn PortalApi {
        self.api.as_ref()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.user.lock().clone()
    }

    pub fn admin(&self) -> Option<Admin> {
        self.admin.lock().clone()
    }

    /// Whether an identity of this kind is currently held
    pub fn identity(&self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::User => self.user.lock().is_some(),
            SessionKind::Admin => self.admin.lock().is_some(),
        }
    }

    /// Load mirrored identities and hand the stored tokens back to the jar.
    /// Unreadable entries are dropped rather than failing the restore.
    pub fn restore(&self) {
        for kind in SessionKind::ALL {
            if let Some(token) = self.store.get(kind.token_key()).filter(|t| !t.is_empty()) {
                self.api.set_cookie(kind.cookie_name(), &token);
            }
        }

        if let Some(raw) = self.store.get(SessionKind::User.identity_key()) {
            match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(user) => *self.user.lock() = Some(user),
                Err(e) => warn!(error = %e, "Discarding stored customer identity"),
            }
        }
        if let Some(raw) = self.store.get(SessionKind::Admin.identity_key()) {
            match serde_json::from_str::<Admin>(&raw) {
                Ok(admin) => *self.admin.lock() = Some(admin),
                Err(e) => warn!(error = %e, "Discarding stored admin identity"),
            }
        }
    }

    /// Record a completed sign-in; no network
    pub fn login(&self, payload: LoginPayload) -> Result<()> {
        match payload {
            LoginPayload::User { user, token } => {
                let identity = UserIdentity {
                    phone: user.phone.clone(),
                    customer: user.customer_name().map(str::to_string),
                    profile: None,
                };
                self.store.set(
                    SessionKind::User.identity_key(),
                    &serde_json::to_string(&identity)?,
                )?;
                self.store.set(SessionKind::User.token_key(), &token)?;
                self.api.set_cookie(SessionKind::User.cookie_name(), &token);
                *self.user.lock() = Some(identity);
            }
            LoginPayload::Admin(summary) => {
                let admin = Admin {
                    email: summary.email,
                    name: summary.name,
                };
                self.store.set(
                    SessionKind::Admin.identity_key(),
                    &serde_json::to_string(&admin)?,
                )?;
                self.store
                    .set(SessionKind::Admin.token_key(), &summary.admin_token)?;
                self.api
                    .set_cookie(SessionKind::Admin.cookie_name(), &summary.admin_token);
                *self.admin.lock() = Some(admin);
            }
        }
        Ok(())
    }

    fn forget(&self, kind: SessionKind) {
        for key in [kind.identity_key(), kind.token_key()] {
            if let Err(e) = self.store.remove(key) {
                warn!(key = key, error = %e, "Failed to clear stored session key");
            }
        }
        match kind {
            SessionKind::User => *self.user.lock() = None,
            SessionKind::Admin => *self.admin.lock() = None,
        }
    }

    /// End one session and return the page to show next.
    ///
    /// Local state is cleared whatever the server answers.
    pub async fn logout(&self, kind: SessionKind) -> String {
        if let Err(e) = self.api.logout(kind).await {
            warn!(kind = %kind, error = %e, "Logout request failed; clearing local session anyway");
        }

        self.forget(kind);
        for name in SESSION_COOKIES {
            self.api.expire_cookie(name);
        }
        kind.entry_path().to_string()
    }

    /// Revalidate both identities against the server
    pub async fn check_auth(&self, current_path: &str) -> AuthCheck {
        let (user_status, admin_status) =
            tokio::join!(self.api.user_status(), self.api.admin_status());

        let user_profile = match user_status {
            Ok(reply) if reply.success => Some(reply.user.unwrap_or_default()),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Customer session check failed");
                None
            }
        };
        let admin = match admin_status {
            Ok(reply) if reply.success && reply.is_admin => Some(reply.admin.unwrap_or_default()),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "Admin session check failed");
                None
            }
        };

        let mut check = AuthCheck {
            user_valid: user_profile.is_some(),
            admin_valid: admin.is_some(),
            redirect: None,
        };

        let user_redirect = match user_profile {
            Some(profile) => {
                *self.user.lock() = Some(UserIdentity::from_profile(profile));
                (current_path == "/" || current_path == SIGN_IN_PATH)
                    .then(|| SessionKind::User.landing_path().to_string())
            }
            None => {
                self.forget(SessionKind::User);
                redirect_if_protected(SessionKind::User, current_path)
            }
        };

        let admin_redirect = match admin {
            Some(admin) => {
                *self.admin.lock() = Some(admin);
                (current_path == SessionKind::Admin.entry_path())
                    .then(|| SessionKind::Admin.landing_path().to_string())
            }
            None => {
                self.forget(SessionKind::Admin);
                redirect_if_protected(SessionKind::Admin, current_path)
            }
        };

        check.redirect = user_redirect.or(admin_redirect);
        check
    }

    pub async fn refresh(&self, current_path: &str) -> AuthCheck {
        self.check_auth(current_path).await
    }

    /// Focus-triggered revalidation. Returns `None` when a check is already
    /// running.
    pub async fn on_focus(&self, current_path: &str) -> Option<AuthCheck> {
        if self.checking.swap(true, Ordering::SeqCst) {
            return None;
        }
        let _guard = InFlight(&self.checking);

        tokio::time::sleep(FOCUS_DEBOUNCE).await;
        Some(self.check_auth(current_path).await)
    }
}

fn redirect_if_protected(kind: SessionKind, path: &str) -> Option<String> {
    path_has_prefix(path, kind.protected_prefix()).then(|| kind.entry_path().to_string())
}
