//! Application bootstrap.
//!
//! DESIGN
//! ======
//! `App` wires the gateway, session store, storage, and router together
//! once per process and restores any previous session before the first
//! navigation. The gateway holds the session store only weakly, so dropping
//! the `App` tears the graph down.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::router::{History, RouteGuard, Router};
use crate::state::session::SessionStore;
use crate::state::storage::{FileStore, KeyValueStore};

pub struct App {
    pub config: ClientConfig,
    pub gateway: Arc<ApiGateway>,
    pub session: Arc<SessionStore>,
    pub storage: Arc<dyn KeyValueStore>,
    pub router: Router,
}

impl App {
    /// Bootstrap with a [`FileStore`] at the configured storage path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP clients cannot be built.
    pub async fn bootstrap(config: ClientConfig) -> Result<Self, ApiError> {
        let storage = Arc::new(FileStore::new(&config.storage_path));
        Self::with_storage(config, storage).await
    }

    /// Bootstrap over any storage backend.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the HTTP clients cannot be built.
    pub async fn with_storage(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let gateway = Arc::new(ApiGateway::new(&config)?);
        let history = History::new();
        let session =
            SessionStore::new(Arc::clone(&gateway), Arc::clone(&storage), history.clone(), config.session_lifetime_secs);
        let router = Router::new(RouteGuard::new(Arc::clone(&session)), history, Arc::clone(&storage));

        let authenticated = session.initialize_auth().await;
        tracing::info!(backend = %config.backend_url, authenticated, "client ready");

        Ok(Self { config, gateway, session, storage, router })
    }

    #[must_use]
    pub fn history(&self) -> &History {
        self.router.history()
    }
}
