//! Response interceptor over the two HTTP clients.
//!
//! ARCHITECTURE
//! ============
//! `ApiGateway` owns the auth-only client, the general client, and the
//! refresh state machine. Endpoint wrappers call [`ApiGateway::auth`] for
//! `/api/Auth/*` traffic and [`ApiGateway::send`] for everything else.
//!
//! General client policy:
//! - 401 on a request not yet retried: single-flight refresh on the auth
//!   client, then replay once. Refresh failure rejects with the refresh error
//!   and forces logout.
//! - 401 on an already retried request, or while the machine is `Failed`:
//!   surfaced unchanged.
//! - 403 anywhere: forced logout, error surfaced.
//!
//! Auth client policy: a 401 from the refresh endpoint forces logout; nothing
//! on the auth client is ever retried.
//!
//! The gateway does not know the session store. Forced logout goes through a
//! [`SessionHook`] registered after construction and held weakly, since the
//! store itself owns an `Arc` of the gateway.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::sync::{Arc, RwLock, Weak};

use reqwest::cookie::Jar;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::http::{ApiReply, HttpClient, PendingRequest};
use super::refresh::{RefreshMachine, RefreshOutcome, RefreshState, Ticket};
use super::types::ApiResponse;
use crate::config::ClientConfig;
use crate::error::ApiError;

pub const REFRESH_PATH: &str = "/api/Auth/RefreshToken";

// =============================================================================
// SESSION HOOK
// =============================================================================

/// Why the gateway is forcing the session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The refresh call failed for any reason.
    RefreshFailed,
    /// The refresh endpoint itself answered 401.
    RefreshRejected,
    /// A request was answered 403.
    Forbidden,
}

/// Receiver of forced-logout events. Implemented by the session store.
#[async_trait::async_trait]
pub trait SessionHook: Send + Sync {
    async fn force_logout(&self, reason: LogoutReason);
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct ApiGateway {
    auth: HttpClient,
    general: HttpClient,
    refresh: RefreshMachine,
    hook: RwLock<Option<Weak<dyn SessionHook>>>,
}

impl ApiGateway {
    /// Build both clients over a shared cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if either client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        Ok(Self {
            auth: HttpClient::new(config, Arc::clone(&jar), "auth")?,
            general: HttpClient::new(config, jar, "general")?,
            refresh: RefreshMachine::new(),
            hook: RwLock::new(None),
        })
    }

    /// Register the receiver of forced-logout events.
    pub fn set_session_hook(&self, hook: Weak<dyn SessionHook>) {
        *self.hook.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(hook);
    }

    #[must_use]
    pub fn refresh_state(&self) -> RefreshState {
        self.refresh.state()
    }

    async fn force_logout(&self, reason: LogoutReason) {
        let hook = self
            .hook
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .and_then(Weak::upgrade);
        match hook {
            Some(hook) => {
                tracing::info!(?reason, "forcing logout");
                hook.force_logout(reason).await;
            }
            None => tracing::warn!(?reason, "forced logout requested but no session hook is registered"),
        }
    }

    // -------------------------------------------------------------------------
    // Auth-only client
    // -------------------------------------------------------------------------

    /// Send on the auth-only client. Never retried.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the call.
    pub async fn auth(&self, request: PendingRequest) -> Result<ApiReply, ApiError> {
        let result = self.auth.execute(&request).await;
        if let Err(err) = &result {
            if err.is_unauthorized() && is_refresh_path(&request.path) {
                self.force_logout(LogoutReason::RefreshRejected).await;
            }
        }
        result
    }

    /// Renew the session explicitly, e.g. a silent refresh at start-up.
    ///
    /// Leaves `Failed` first and joins an in-flight refresh if one exists.
    /// Failure is returned to the caller without forcing logout; the caller
    /// owns the session decision.
    ///
    /// # Errors
    ///
    /// Returns the refresh call's error.
    pub async fn refresh_session(&self) -> RefreshOutcome {
        self.refresh.rearm();
        self.run_refresh(self.refresh.epoch(), false).await
    }

    /// Re-enable automatic refresh after the user authenticated again.
    pub fn rearm(&self) {
        self.refresh.rearm();
    }

    async fn run_refresh(&self, observed_epoch: u64, force_logout_on_failure: bool) -> RefreshOutcome {
        match self.refresh.begin(observed_epoch) {
            Ticket::AlreadyRefreshed => Ok(()),
            Ticket::Refused => Err(ApiError::from_status(401, REFRESH_PATH, String::new())),
            Ticket::Follower(rx) => RefreshMachine::wait(rx).await,
            Ticket::Leader(guard) => {
                let outcome = self.auth.execute(&PendingRequest::post(REFRESH_PATH)).await.map(|_| ());
                guard.finish(outcome.clone());
                if let Err(err) = &outcome {
                    if force_logout_on_failure {
                        let reason =
                            if err.is_unauthorized() { LogoutReason::RefreshRejected } else { LogoutReason::RefreshFailed };
                        self.force_logout(reason).await;
                    }
                }
                outcome
            }
        }
    }

    // -------------------------------------------------------------------------
    // General client
    // -------------------------------------------------------------------------

    /// Send on the general client with refresh-and-retry interception.
    ///
    /// # Errors
    ///
    /// Returns the refresh error when a refresh was needed and failed,
    /// otherwise the classified error of the (possibly replayed) call.
    pub async fn send(&self, mut request: PendingRequest) -> Result<ApiReply, ApiError> {
        loop {
            let epoch = self.refresh.epoch();
            let err = match self.general.execute(&request).await {
                Ok(reply) => return Ok(reply),
                Err(err) => err,
            };

            if err.is_forbidden() {
                self.force_logout(LogoutReason::Forbidden).await;
                return Err(err);
            }
            if !err.is_unauthorized() {
                return Err(err);
            }
            if is_refresh_path(&request.path) {
                self.force_logout(LogoutReason::RefreshRejected).await;
                return Err(err);
            }
            if request.is_retried() {
                tracing::debug!(path = %request.path, "401 after replay; not refreshing again");
                return Err(err);
            }
            if self.refresh.state() == RefreshState::Failed {
                return Err(err);
            }

            self.run_refresh(epoch, true).await?;
            request.mark_retried();
            tracing::debug!(path = %request.path, "replaying request after refresh");
        }
    }

    // -------------------------------------------------------------------------
    // Envelope helpers
    // -------------------------------------------------------------------------

    /// `send` and decode the `{ data, message }` envelope.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiGateway::send`] errors and [`ApiError::Decode`].
    pub async fn call<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<ApiResponse<T>, ApiError> {
        decode_envelope(&self.send(request).await?)
    }

    /// `auth` and decode the `{ data, message }` envelope.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiGateway::auth`] errors and [`ApiError::Decode`].
    pub async fn call_auth<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<ApiResponse<T>, ApiError> {
        decode_envelope(&self.auth(request).await?)
    }

    /// Convenience for `call` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::call`].
    pub async fn call_with<B, T>(&self, request: PendingRequest, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(request.json(body)?).await
    }
}

/// A 2xx without a body (e.g. 204) decodes as an empty envelope.
fn decode_envelope<T: DeserializeOwned>(reply: &ApiReply) -> Result<ApiResponse<T>, ApiError> {
    if reply.body.trim().is_empty() {
        return Ok(ApiResponse { data: None, message: String::new() });
    }
    reply.json()
}

fn is_refresh_path(path: &str) -> bool {
    path.trim_start_matches('/').eq_ignore_ascii_case(REFRESH_PATH.trim_start_matches('/'))
}
