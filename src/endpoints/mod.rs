//! Typed wrappers for every backend endpoint the client calls.
//!
//! DESIGN
//! ======
//! One free async function per endpoint, grouped by backend controller.
//! Each takes the shared [`ApiGateway`](crate::net::gateway::ApiGateway) and
//! returns the decoded `{ data, message }` envelope. `/api/Auth/*` calls (and
//! registration) go through the auth-only client and are never retried;
//! everything else goes through the general client with refresh-and-retry.

pub mod admin;
pub mod auth;
pub mod driver;
pub mod map;
pub mod user;
