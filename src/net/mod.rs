//! Network layer: HTTP clients, refresh coordination, and wire types.
//!
//! DESIGN
//! ======
//! `http` sends requests and classifies failures. `refresh` is the
//! single-flight refresh state machine. `gateway` combines them into the
//! interceptor every endpoint wrapper calls through. `types` holds the
//! backend's DTOs.

pub mod gateway;
pub mod http;
pub mod refresh;
pub mod types;
