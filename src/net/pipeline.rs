//! Request pipeline: ordered stages wrapped around the transport.
//!
//! DESIGN
//! ======
//! `before` runs in stage order and may hand back a `StageScope`; the
//! transport call runs; `after` runs in reverse order with the outcome; the
//! scopes are dropped last. Because scopes live in the request future, they
//! are also released when the caller drops that future mid-flight.
//!
//! Stages observe outcomes but never replace them: the caller always gets
//! exactly what the transport returned.

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;

use std::sync::Arc;

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::types::ApiError;
use crate::config::PortalConfig;
use crate::router::queue::Navigator;
use crate::router::routes::{LOGIN_PATH, path_has_prefix};
use crate::state::loading::LoadingState;
use crate::state::session::SessionExpiry;

pub type Outcome = Result<ApiResponse, ApiError>;

// =============================================================================
// STAGE CONTRACT
// =============================================================================

/// Value a stage keeps alive for the duration of one request.
#[derive(Default)]
pub struct StageScope {
    held: Option<Box<dyn Send>>,
}

impl StageScope {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn hold<T: Send + 'static>(value: T) -> Self {
        Self { held: Some(Box::new(value)) }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_none()
    }
}

pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, _request: &ApiRequest) -> StageScope {
        StageScope::empty()
    }

    fn after(&self, _request: &ApiRequest, _outcome: &Outcome) {}
}

// =============================================================================
// PIPELINE
// =============================================================================

pub struct Pipeline {
    transport: Arc<dyn Transport>,
    stages: Vec<Arc<dyn PipelineStage>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport, stages: Vec::new() }
    }

    /// Pipeline with the auth-error and loading stages in their usual order.
    #[must_use]
    pub fn standard(
        transport: Arc<dyn Transport>,
        config: &PortalConfig,
        expiry: SessionExpiry,
        loading: LoadingState,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(transport)
            .with_stage(AuthErrorStage::new(expiry, navigator))
            .with_stage(LoadingStage::new(loading, config.untracked_prefixes.clone()))
    }

    #[must_use]
    pub fn with_stage(mut self, stage: impl PipelineStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Send `request` through every stage.
    ///
    /// # Errors
    ///
    /// Returns the transport's error unchanged.
    pub async fn send(&self, request: ApiRequest) -> Outcome {
        let _scopes: Vec<StageScope> = self.stages.iter().map(|stage| stage.before(&request)).collect();
        let outcome = self.transport.send(&request).await;
        for stage in self.stages.iter().rev() {
            stage.after(&request, &outcome);
        }
        outcome
    }
}

// =============================================================================
// AUTH ERROR STAGE
// =============================================================================

/// Reacts to 401 responses: clears the session and asks for the login screen.
/// The error itself still reaches the caller.
pub struct AuthErrorStage {
    expiry: SessionExpiry,
    navigator: Arc<dyn Navigator>,
}

impl AuthErrorStage {
    #[must_use]
    pub fn new(expiry: SessionExpiry, navigator: Arc<dyn Navigator>) -> Self {
        Self { expiry, navigator }
    }
}

impl PipelineStage for AuthErrorStage {
    fn name(&self) -> &'static str {
        "auth-error"
    }

    fn after(&self, request: &ApiRequest, outcome: &Outcome) {
        let Err(error) = outcome else {
            return;
        };
        if !error.is_unauthorized() {
            return;
        }
        let had_session = self.expiry.expire();
        tracing::warn!(path = %request.path, had_session, "backend rejected session; redirecting to login");
        self.navigator.request_navigation(LOGIN_PATH);
    }
}

// =============================================================================
// LOADING STAGE
// =============================================================================

/// Counts tracked requests for the loading indicator.
pub struct LoadingStage {
    loading: LoadingState,
    untracked_prefixes: Vec<String>,
}

impl LoadingStage {
    #[must_use]
    pub fn new(loading: LoadingState, untracked_prefixes: Vec<String>) -> Self {
        Self { loading, untracked_prefixes }
    }

    /// Untracked prefixes match whole path segments only.
    #[must_use]
    pub fn is_tracked(&self, path: &str) -> bool {
        !self.untracked_prefixes.iter().any(|prefix| path_has_prefix(path, prefix))
    }
}

impl PipelineStage for LoadingStage {
    fn name(&self) -> &'static str {
        "loading"
    }

    fn before(&self, request: &ApiRequest) -> StageScope {
        if self.is_tracked(&request.path) {
            StageScope::hold(self.loading.begin())
        } else {
            StageScope::empty()
        }
    }
}
