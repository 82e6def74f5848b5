//! Client-side state.
//!
//! DESIGN
//! ======
//! `session` owns the authentication state and its transitions. `storage`
//! persists the small bits that must survive a restart: the auth marker and
//! the last visited route.

pub mod session;
pub mod storage;
