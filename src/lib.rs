//! # pegasus
//!
//! Session-aware client for the Pegasus taxi booking backend.
//!
//! The interesting part is authentication: cookie sessions shared by two
//! HTTP clients, a single-flight token refresh that replays 401'd requests
//! once, forced logout on unrecoverable auth failures, and a route guard
//! that restores and checks the session before every navigation. Around it
//! sit typed wrappers for every backend endpoint and a few booking helpers.

pub mod app;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod net;
pub mod router;
pub mod state;
pub mod util;
