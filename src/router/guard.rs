//! Pre-navigation guard.
//!
//! RULES
//! =====
//! 1. Not authenticated for routing: try `initialize_auth` once.
//! 2. Route requires auth and the user still is not: `/login`.
//! 3. Guest-only route while authenticated: the role default.
//! 4. Route requires a role the profile lacks: the last persisted route if
//!    it resolves, differs from the destination, and is itself permitted;
//!    otherwise the role default.
//! 5. Otherwise allow.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use std::sync::Arc;

use super::{LOGIN_PATH, RouteDef, resolve};
use crate::net::types::UserProfile;
use crate::state::session::SessionStore;
use crate::state::storage::read_last_route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub async fn check(&self, to: &RouteDef) -> GuardDecision {
        if !self.session.is_routing_authenticated() {
            self.session.initialize_auth().await;
        }
        let authenticated = self.session.is_routing_authenticated();

        if to.meta.requires_auth && !authenticated {
            return GuardDecision::Redirect(LOGIN_PATH.to_owned());
        }
        if to.meta.guest_only && authenticated {
            return GuardDecision::Redirect(self.session.load_route_based_on_role().to_owned());
        }
        if let Some(role) = to.meta.required_role {
            let user = self.session.user();
            if !user.as_ref().is_some_and(|u| u.has_role(role)) {
                let fallback = read_last_route(self.session.storage().as_ref())
                    .and_then(|last| resolve(&last))
                    .filter(|last| last.path != to.path && permits(last, user.as_ref()))
                    .map_or_else(|| self.session.load_route_based_on_role(), |last| last.path);
                tracing::info!(to = to.path, ?role, redirect = fallback, "missing role for route");
                return GuardDecision::Redirect(fallback.to_owned());
            }
        }
        GuardDecision::Allow
    }
}

/// Whether `user` (signed in, with roles) may stay on `route`.
fn permits(route: &RouteDef, user: Option<&UserProfile>) -> bool {
    let Some(user) = user.filter(|u| !u.roles.is_empty()) else {
        return !route.meta.requires_auth;
    };
    !route.meta.guest_only && route.meta.required_role.is_none_or(|role| user.has_role(role))
}
