//! Guarded client-side navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Router::navigate` resolves a path against the route table, runs the
//! global guards (bootstrap) and then the route's own guards in order. The
//! first non-allow decision wins. A redirect starts a fresh top-level
//! navigation to its target, so the target's guards run too; chains longer
//! than `MAX_REDIRECTS` are reported as a loop.
//!
//! A screen is committed only after every guard for it has allowed.

pub mod guards;
pub mod queue;
pub mod routes;


use std::sync::{Arc, Mutex};

use guards::{BootstrapGuard, Decision, GuardContext, NavigationGuard};
use queue::NavigationRequests;
use routes::{RouteTable, normalize_path};

use crate::config::PortalConfig;
use crate::net::api::SessionCheck;
use crate::state::session::{SessionExpiry, SessionReader};

pub const MAX_REDIRECTS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("redirect loop while navigating to {path} ({hops} redirects)")]
    RedirectLoop { path: String, hops: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    Committed { path: String, screen: &'static str },
    /// A guard denied without redirecting; the location is unchanged.
    Denied { path: String },
}

/// Result of one `navigate` call, including every redirect hop taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub requested: String,
    pub redirects: Vec<String>,
    pub outcome: NavigationOutcome,
}

impl Navigation {
    #[must_use]
    pub fn committed_path(&self) -> Option<&str> {
        match &self.outcome {
            NavigationOutcome::Committed { path, .. } => Some(path),
            NavigationOutcome::Denied { .. } => None,
        }
    }

    /// True when the requested screen itself was entered.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.redirects.is_empty() && self.committed_path().is_some()
    }
}

enum Step {
    Commit(&'static str),
    Deny,
    Redirect(String),
}

pub struct Router {
    table: RouteTable,
    global_guards: Vec<Arc<dyn NavigationGuard>>,
    location: Mutex<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self { table, global_guards: Vec::new(), location: Mutex::new(None), history: Mutex::new(Vec::new()) }
    }

    /// Standard route tree with the bootstrap guard in front of it.
    #[must_use]
    pub fn standard(
        session: &SessionReader,
        expiry: SessionExpiry,
        checker: Arc<dyn SessionCheck>,
        config: &PortalConfig,
    ) -> Self {
        Self::new(RouteTable::standard(session))
            .with_global_guard(BootstrapGuard::new(checker, expiry, config.bootstrap_bypass_prefixes.clone()))
    }

    /// Guard evaluated before the route's own guards on every navigation.
    #[must_use]
    pub fn with_global_guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.global_guards.push(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Currently committed path, if any navigation has committed yet.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        self.location.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Every committed path, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Navigate to `path`, following redirects issued by guards.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::RedirectLoop` when the redirect chain
    /// exceeds `MAX_REDIRECTS`.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, NavigationError> {
        let requested = normalize_path(path);
        let mut target = requested.clone();
        let mut redirects = Vec::new();

        loop {
            let step = self.evaluate(&target).await;
            match step {
                Step::Commit(screen) => {
                    self.commit(&target);
                    tracing::info!(path = %target, screen, redirects = redirects.len(), "navigation committed");
                    let outcome = NavigationOutcome::Committed { path: target, screen };
                    return Ok(Navigation { requested, redirects, outcome });
                }
                Step::Deny => {
                    tracing::info!(path = %target, "navigation denied");
                    let outcome = NavigationOutcome::Denied { path: target };
                    return Ok(Navigation { requested, redirects, outcome });
                }
                Step::Redirect(to) => {
                    if redirects.len() >= MAX_REDIRECTS {
                        tracing::warn!(path = %requested, "redirect loop detected");
                        return Err(NavigationError::RedirectLoop { path: requested, hops: redirects.len() });
                    }
                    let to = normalize_path(&to);
                    tracing::debug!(from = %target, to = %to, "navigation redirected");
                    redirects.push(to.clone());
                    target = to;
                }
            }
        }
    }

    /// Process navigation requests raised by pipeline stages. A request for
    /// the already committed path is ignored.
    pub async fn drain_requests(
        &self,
        requests: &mut NavigationRequests,
    ) -> Vec<Result<Navigation, NavigationError>> {
        let mut results = Vec::new();
        while let Some(path) = requests.try_next() {
            let path = normalize_path(&path);
            if self.location().as_deref() == Some(path.as_str()) {
                tracing::debug!(%path, "ignoring navigation request to current location");
                continue;
            }
            results.push(self.navigate(&path).await);
        }
        results
    }

    async fn evaluate(&self, path: &str) -> Step {
        let Some(entry) = self.table.resolve(path) else {
            return Step::Redirect(self.table.fallback().to_owned());
        };

        let ctx = GuardContext { path };
        for guard in self.global_guards.iter().chain(entry.guards()) {
            match guard.check(&ctx).await {
                Decision::Allow => {}
                Decision::Deny => {
                    tracing::debug!(%path, guard = guard.name(), "guard denied");
                    return Step::Deny;
                }
                Decision::Redirect(to) => {
                    tracing::debug!(%path, guard = guard.name(), %to, "guard redirected");
                    return Step::Redirect(to);
                }
            }
        }
        Step::Commit(entry.screen())
    }

    fn commit(&self, path: &str) {
        *self.location.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(path.to_owned());
        self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(path.to_owned());
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
