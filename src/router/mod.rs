//! Route table, navigation history, and the guarded router.
//!
//! ARCHITECTURE
//! ============
//! [`ROUTES`] mirrors the dashboards of the booking frontend. Every
//! navigation goes through [`Router::navigate`], which resolves the path,
//! asks the [`RouteGuard`] for a decision, and follows redirects (re-running
//! the guard each hop) until a route is allowed. Allowed navigations land in
//! the shared [`History`]; allowed authenticated routes are also persisted
//! as the last route.
//!
//! `History` is shared with the session store so logout can send the user
//! to `/login` without the store depending on the router.


pub mod guard;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::types::Role;
use crate::state::storage::{KeyValueStore, write_last_route};
pub use guard::{GuardDecision, RouteGuard};

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const ADMIN_PATH: &str = "/admin";
pub const DRIVER_PATH: &str = "/driver";
pub const CUSTOMER_PATH: &str = "/customer";

/// Redirect hops followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 8;

// =============================================================================
// ROUTE TABLE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub guest_only: bool,
    pub required_role: Option<Role>,
}

impl RouteMeta {
    const PUBLIC: Self = Self { requires_auth: false, guest_only: false, required_role: None };
    const GUEST: Self = Self { requires_auth: false, guest_only: true, required_role: None };

    const fn role(role: Role) -> Self {
        Self { requires_auth: true, guest_only: false, required_role: Some(role) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub name: &'static str,
    pub meta: RouteMeta,
}

const fn route(path: &'static str, name: &'static str, meta: RouteMeta) -> RouteDef {
    RouteDef { path, name, meta }
}

pub static ROUTES: [RouteDef; 15] = [
    route(HOME_PATH, "home", RouteMeta::PUBLIC),
    route(LOGIN_PATH, "login", RouteMeta::GUEST),
    route("/register", "register", RouteMeta::GUEST),
    route(ADMIN_PATH, "overview", RouteMeta::role(Role::Admin)),
    route("/admin/drivers", "drivers", RouteMeta::role(Role::Admin)),
    route("/admin/bookings", "bookings", RouteMeta::role(Role::Admin)),
    route("/admin/prices", "prices", RouteMeta::role(Role::Admin)),
    route("/admin/trips", "trips", RouteMeta::role(Role::Admin)),
    route(DRIVER_PATH, "driverOverview", RouteMeta::role(Role::Driver)),
    route("/driver/profile", "driverProfile", RouteMeta::role(Role::Driver)),
    route("/driver/bookings", "driverBookings", RouteMeta::role(Role::Driver)),
    route("/driver/car", "driverCar", RouteMeta::role(Role::Driver)),
    route(CUSTOMER_PATH, "customerOverview", RouteMeta::role(Role::User)),
    route("/customer/book", "customerBooking", RouteMeta::role(Role::User)),
    route("/customer/profile", "customerProfile", RouteMeta::role(Role::User)),
];

/// Look up a path. Query string, fragment, trailing slash, and letter case
/// are ignored.
#[must_use]
pub fn resolve(path: &str) -> Option<&'static RouteDef> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    let normalized = if trimmed.is_empty() { HOME_PATH } else { trimmed };
    ROUTES.iter().find(|r| r.path.eq_ignore_ascii_case(normalized))
}

// =============================================================================
// HISTORY
// =============================================================================

/// Shared navigation stack. Cloning shares the same stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<String>>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push `path` unless it is already the current entry.
    pub fn push(&self, path: &str) {
        let mut entries = self.lock();
        if entries.last().map(String::as_str) != Some(path) {
            entries.push(path.to_owned());
        }
    }

    pub fn replace(&self, path: &str) {
        let mut entries = self.lock();
        entries.pop();
        entries.push(path.to_owned());
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// No route matches the path.
    #[error("no route matches {0}")]
    NotFound(String),

    /// Redirects kept bouncing between routes.
    #[error("too many redirects navigating to {0}")]
    TooManyRedirects(String),
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub route: &'static RouteDef,
    /// The requested path when the guard redirected away from it.
    pub redirected_from: Option<String>,
}

pub struct Router {
    guard: RouteGuard,
    history: History,
    storage: Arc<dyn KeyValueStore>,
}

impl Router {
    #[must_use]
    pub fn new(guard: RouteGuard, history: History, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { guard, history, storage }
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Navigate to `path`, following guard redirects.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotFound`] if the path or a redirect target
    /// is not in the route table, and [`NavigationError::TooManyRedirects`]
    /// after [`MAX_REDIRECTS`] hops.
    pub async fn navigate(&self, path: &str) -> Result<NavigationOutcome, NavigationError> {
        let mut target = path.to_owned();
        let mut redirected = false;
        for _ in 0..=MAX_REDIRECTS {
            let route = resolve(&target).ok_or_else(|| NavigationError::NotFound(target.clone()))?;
            match self.guard.check(route).await {
                GuardDecision::Allow => {
                    self.history.push(route.path);
                    if route.meta.requires_auth {
                        write_last_route(self.storage.as_ref(), route.path);
                    }
                    let redirected_from = redirected.then(|| path.to_owned());
                    tracing::debug!(to = route.path, ?redirected_from, "navigated");
                    return Ok(NavigationOutcome { route, redirected_from });
                }
                GuardDecision::Redirect(next) => {
                    tracing::debug!(from = route.path, to = %next, "guard redirect");
                    target = next;
                    redirected = true;
                }
            }
        }
        tracing::warn!(path, "redirect limit reached");
        Err(NavigationError::TooManyRedirects(path.to_owned()))
    }
}
