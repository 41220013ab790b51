//! Wiring for a running portal client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Portal` owns one of everything: the session store (through the gateway),
//! the loading counters, the pipeline, the router and the receiving end of
//! the navigation queue. Screens and the CLI talk to this type only.
//!
//! Navigation requests raised by the pipeline are not acted on until
//! `process_pending` is called, so a guard that triggers a 401 while the
//! router is already redirecting does not cause a second redirect.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::PortalConfig;
use crate::net::api::AuthGateway;
use crate::net::pipeline::{Outcome, Pipeline};
use crate::net::transport::{ApiRequest, HttpTransport, Transport};
use crate::net::types::ApiError;
use crate::router::queue::{NavigationRequests, navigation_queue};
use crate::router::{Navigation, NavigationError, Router};
use crate::state::loading::LoadingState;
use crate::state::session::{SessionReader, SessionStore};

pub struct Portal {
    config: PortalConfig,
    gateway: Arc<AuthGateway>,
    loading: LoadingState,
    router: Router,
    requests: NavigationRequests,
}

impl Portal {
    /// Assemble the portal around an existing transport.
    #[must_use]
    pub fn new(config: PortalConfig, transport: Arc<dyn Transport>) -> Self {
        let store = SessionStore::new();
        let session = store.reader();
        let loading = LoadingState::new();
        let (queue, requests) = navigation_queue();
        let store_expiry = store.expiry();

        let pipeline =
            Pipeline::standard(transport, &config, store.expiry(), loading.clone(), Arc::new(queue));
        let gateway = Arc::new(AuthGateway::new(Arc::new(pipeline), store));
        let router = Router::standard(&session, store_expiry, gateway.clone(), &config);

        tracing::debug!(api_url = %config.api_url, "portal assembled");
        Self { config, gateway, loading, router, requests }
    }

    /// Assemble the portal over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ClientBuild` if the HTTP client cannot be built.
    pub fn connect(config: PortalConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    #[must_use]
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    #[must_use]
    pub fn session(&self) -> SessionReader {
        self.gateway.session()
    }

    #[must_use]
    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Guarded navigation to `path`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::RedirectLoop` when guards keep redirecting.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        self.router.navigate(path).await
    }

    /// Domain call through the shared pipeline.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn request(&self, request: ApiRequest) -> Outcome {
        self.gateway.pipeline().send(request).await
    }

    /// Act on navigation requests raised since the last call.
    pub async fn process_pending(&mut self) -> Vec<Result<Navigation, NavigationError>> {
        self.router.drain_requests(&mut self.requests).await
    }
}
