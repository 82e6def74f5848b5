//! Session store: the process-wide authentication state.
//!
//! DESIGN
//! ======
//! `SessionStore` is the only writer of [`Session`]. Its fields change only
//! as a result of login, two-factor verification, silent refresh, and
//! logout. The lock around the session is synchronous and never held across
//! an await.
//!
//! LIFECYCLE
//! =========
//! 1. `login` starts the flow; the user is NOT authenticated yet.
//! 2. `verify_two_factor` completes it: flag on, lifetime and profile
//!    fetched, auth marker persisted. Without a profile it logs out again.
//! 3. `initialize_auth` restores a session at start-up from the marker via a
//!    silent refresh.
//! 4. `logout` (explicit or forced by the gateway) clears everything and
//!    sends the user to `/login`. It cannot fail.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use time::OffsetDateTime;

use super::storage::{AuthMarker, KeyValueStore, clear_auth_marker, read_auth_marker, write_auth_marker};
use crate::endpoints::{auth, user};
use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::net::gateway::{ApiGateway, LogoutReason, SessionHook};
use crate::net::types::{LoginRequest, PasswordResetRequest, RegistrationRequest, Role, TwoFactorRequest, UserProfile};
use crate::router::{ADMIN_PATH, CUSTOMER_PATH, DRIVER_PATH, History, LOGIN_PATH};

pub const LOGIN_FAILED: &str = "Invalid email or password";
pub const TWO_FACTOR_FAILED: &str = "Something went wrong. Make sure you're using the correct code";

// =============================================================================
// TYPES
// =============================================================================

/// Snapshot of the client's view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub is_authenticated: bool,
    pub session_lifetime_seconds: u64,
    pub user: Option<UserProfile>,
}

/// Outcome of a user-facing auth action, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

impl ActionResult {
    fn ok(message: String) -> Self {
        Self { success: true, message }
    }

    fn failed(message: &str) -> Self {
        Self { success: false, message: message.to_owned() }
    }
}

/// Default landing path for a role set.
#[must_use]
pub fn route_for_roles(roles: &BTreeSet<Role>) -> &'static str {
    if Role::ALL.iter().all(|r| roles.contains(r)) || roles.contains(&Role::Admin) {
        ADMIN_PATH
    } else if roles.contains(&Role::Driver) {
        DRIVER_PATH
    } else if roles.contains(&Role::User) {
        CUSTOMER_PATH
    } else {
        LOGIN_PATH
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct SessionStore {
    gateway: Arc<ApiGateway>,
    storage: Arc<dyn KeyValueStore>,
    history: History,
    default_lifetime_secs: u64,
    session: RwLock<Session>,
    pending_email: Mutex<Option<String>>,
}

impl SessionStore {
    /// Create the store and register it as the gateway's forced-logout hook.
    #[must_use]
    pub fn new(
        gateway: Arc<ApiGateway>,
        storage: Arc<dyn KeyValueStore>,
        history: History,
        default_lifetime_secs: u64,
    ) -> Arc<Self> {
        let store = Arc::new(Self {
            gateway,
            storage,
            history,
            default_lifetime_secs,
            session: RwLock::new(Session {
                is_authenticated: false,
                session_lifetime_seconds: default_lifetime_secs,
                user: None,
            }),
            pending_email: Mutex::new(None),
        });
        let hook: Weak<dyn SessionHook> = Arc::downgrade(&store) as Weak<dyn SessionHook>;
        store.gateway.set_session_hook(hook);
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_pending_email(&self, email: Option<String>) {
        *self.pending_email.lock().unwrap_or_else(PoisonError::into_inner) = email;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    /// Authenticated with a profile carrying at least one role.
    #[must_use]
    pub fn is_routing_authenticated(&self) -> bool {
        let session = self.read();
        session.is_authenticated && session.user.as_ref().is_some_and(|u| !u.roles.is_empty())
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.read().user.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Landing path for the cached profile; `/login` without one.
    #[must_use]
    pub fn load_route_based_on_role(&self) -> &'static str {
        self.read().user.as_ref().map_or(LOGIN_PATH, |u| route_for_roles(&u.roles))
    }

    // -------------------------------------------------------------------------
    // Auth flow
    // -------------------------------------------------------------------------

    /// First login step. Success means a code was sent, nothing more.
    pub async fn login(&self, credentials: &LoginRequest) -> ActionResult {
        match auth::login(&self.gateway, credentials).await {
            Ok(resp) => {
                self.set_pending_email(Some(credentials.email.clone()));
                tracing::info!(email = %credentials.email, "login accepted; awaiting two-factor code");
                ActionResult::ok(resp.message)
            }
            Err(e) => {
                tracing::warn!(email = %credentials.email, error = %e, "login failed");
                ActionResult::failed(LOGIN_FAILED)
            }
        }
    }

    /// Second login step for the email passed to the last successful `login`.
    pub async fn verify_two_factor(&self, code: &str) -> ActionResult {
        let email = self.pending_email.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let Some(email) = email else {
            tracing::warn!("two-factor code submitted without a pending login");
            return ActionResult::failed(TWO_FACTOR_FAILED);
        };

        let request = TwoFactorRequest { email: email.clone(), code: code.trim().to_owned() };
        let resp = match auth::verify_two_fa(&self.gateway, &request).await {
            Ok(resp) if resp.data.as_ref().is_some_and(|d| !d.is_authenticated) => {
                tracing::warn!(%email, "two-factor verification answered not authenticated");
                return ActionResult::failed(TWO_FACTOR_FAILED);
            }
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(%email, error = %e, "two-factor verification failed");
                return ActionResult::failed(TWO_FACTOR_FAILED);
            }
        };

        self.gateway.rearm();
        self.set_pending_email(None);
        self.write().is_authenticated = true;

        let lifetime = self.fetch_session_lifetime().await;
        self.write().session_lifetime_seconds = lifetime;
        if self.load_profile().await.is_err() {
            self.logout_unless_cleared().await;
            return ActionResult::failed(TWO_FACTOR_FAILED);
        }
        write_auth_marker(self.storage.as_ref(), AuthMarker::expiring_after(OffsetDateTime::now_utc(), lifetime));

        tracing::info!(%email, lifetime_secs = lifetime, "authenticated");
        ActionResult::ok(resp.message)
    }

    /// Restore a session from the persisted marker.
    ///
    /// Without a valid marker nothing is sent. With one, the session is
    /// renewed silently and the profile fetched; any failure logs out.
    /// Returns whether the user ends up authenticated.
    pub async fn initialize_auth(&self) -> bool {
        if read_auth_marker(self.storage.as_ref(), OffsetDateTime::now_utc()).is_none() {
            tracing::debug!("no auth marker; staying logged out");
            return false;
        }

        if let Err(e) = self.gateway.refresh_session().await {
            tracing::info!(error = %e, "silent refresh failed");
            self.logout().await;
            return false;
        }
        self.write().is_authenticated = true;

        if let Err(e) = self.load_profile().await {
            tracing::info!(error = %e, "profile fetch after refresh failed");
            self.logout_unless_cleared().await;
            return false;
        }

        let lifetime = self.read().session_lifetime_seconds;
        write_auth_marker(self.storage.as_ref(), AuthMarker::expiring_after(OffsetDateTime::now_utc(), lifetime));
        tracing::info!("session restored");
        true
    }

    /// End the session. Idempotent and infallible.
    pub async fn logout(&self) {
        if let Err(e) = auth::logout(&self.gateway).await {
            tracing::warn!(error = %e, "backend logout failed; clearing local session anyway");
        }
        {
            let mut session = self.write();
            session.is_authenticated = false;
            session.user = None;
            session.session_lifetime_seconds = self.default_lifetime_secs;
        }
        self.set_pending_email(None);
        clear_auth_marker(self.storage.as_ref());
        self.history.push(LOGIN_PATH);
        tracing::info!("logged out");
    }

    pub async fn register(&self, request: &RegistrationRequest) -> ActionResult {
        match auth::register(&self.gateway, request).await {
            Ok(resp) => ActionResult::ok(resp.message),
            Err(e) => {
                tracing::warn!(email = %request.email, error = %e, "registration failed");
                ActionResult::failed(FALLBACK_MESSAGE)
            }
        }
    }

    pub async fn forgot_password(&self, request: &PasswordResetRequest) -> ActionResult {
        match auth::forgot_password(&self.gateway, request).await {
            Ok(resp) => ActionResult::ok(resp.message),
            Err(e) => {
                tracing::warn!(email = %request.email, error = %e, "password reset request failed");
                ActionResult::failed(FALLBACK_MESSAGE)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// A 403 or rejected refresh during the profile fetch already logged out
    /// through the gateway hook.
    async fn logout_unless_cleared(&self) {
        if self.is_authenticated() {
            self.logout().await;
        }
    }

    async fn fetch_session_lifetime(&self) -> u64 {
        match auth::session_lifetime(&self.gateway).await {
            Ok(resp) => resp
                .data
                .map(|d| d.session_lifetime_seconds)
                .filter(|secs| *secs > 0)
                .unwrap_or(self.default_lifetime_secs),
            Err(e) => {
                tracing::warn!(error = %e, "session lifetime unavailable; using default");
                self.default_lifetime_secs
            }
        }
    }

    async fn load_profile(&self) -> Result<(), ApiError> {
        let profile = user::profile(&self.gateway).await.and_then(|resp| {
            resp.data.ok_or_else(|| ApiError::Decode("profile response carried no data".into()))
        });
        match profile {
            Ok(profile) => {
                tracing::debug!(user_id = %profile.id, roles = ?profile.roles, "profile loaded");
                self.write().user = Some(profile);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not load profile");
                Err(e)
            }
        }
    }
}

#[async_trait::async_trait]
impl SessionHook for SessionStore {
    async fn force_logout(&self, reason: LogoutReason) {
        tracing::info!(?reason, "session closed by gateway");
        self.logout().await;
    }
}
