//! Navigation guards evaluated before a route is committed.
//!
//! SYSTEM CONTEXT
//! ==============
//! The bootstrap guard runs first on every top-level navigation and is the
//! only one that awaits the network. The remaining guards read the session
//! synchronously and rely on it having been resolved by the bootstrap guard
//! or a prior login.
//!
//! Guards never fail: each evaluation ends in a `Decision`, and a redirect is
//! carried in the decision for the router to perform.

#[cfg(test)]
#[path = "guards_test.rs"]
mod guards_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::routes::{LOGIN_PATH, path_has_prefix};
use crate::net::api::SessionCheck;
use crate::net::types::RoleCode;
use crate::state::session::{SessionExpiry, SessionReader};

/// Outcome of one guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Deny without any follow-up navigation.
    Deny,
    /// Deny and navigate to the given path instead.
    Redirect(String),
}

impl Decision {
    #[must_use]
    pub fn redirect(path: &str) -> Self {
        Self::Redirect(path.to_owned())
    }

    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// What a guard gets to see about the navigation in progress.
#[derive(Clone, Copy, Debug)]
pub struct GuardContext<'a> {
    pub path: &'a str,
}

#[async_trait]
pub trait NavigationGuard: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self, ctx: &GuardContext<'_>) -> Decision;
}

/// Redirect target for a signed-in user bounced from a screen.
fn dashboard_or_login(session: &SessionReader) -> &'static str {
    session.dashboard_path().unwrap_or(LOGIN_PATH)
}

// =============================================================================
// BOOTSTRAP
// =============================================================================

/// Confirms the backend session before anything outside the auth section.
/// Any failed check drops the local session, so the guest guard on the login
/// screen cannot bounce a stale user back here.
pub struct BootstrapGuard {
    checker: Arc<dyn SessionCheck>,
    expiry: SessionExpiry,
    bypass_prefixes: Vec<String>,
}

impl BootstrapGuard {
    #[must_use]
    pub fn new(checker: Arc<dyn SessionCheck>, expiry: SessionExpiry, bypass_prefixes: Vec<String>) -> Self {
        Self { checker, expiry, bypass_prefixes }
    }

    #[must_use]
    pub fn bypasses(&self, path: &str) -> bool {
        self.bypass_prefixes.iter().any(|prefix| path_has_prefix(path, prefix))
    }
}

#[async_trait]
impl NavigationGuard for BootstrapGuard {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Decision {
        if self.bypasses(ctx.path) {
            return Decision::Allow;
        }
        match self.checker.check_session_status().await {
            Ok(_) => Decision::Allow,
            Err(e) => {
                let had_session = self.expiry.expire();
                tracing::info!(path = %ctx.path, error = %e, had_session, "no valid session; redirecting to login");
                Decision::redirect(LOGIN_PATH)
            }
        }
    }
}

// =============================================================================
// AUTHENTICATED
// =============================================================================

pub struct AuthenticatedGuard {
    session: SessionReader,
}

impl AuthenticatedGuard {
    #[must_use]
    pub fn new(session: SessionReader) -> Self {
        Self { session }
    }
}

#[async_trait]
impl NavigationGuard for AuthenticatedGuard {
    fn name(&self) -> &'static str {
        "authenticated"
    }

    async fn check(&self, _ctx: &GuardContext<'_>) -> Decision {
        if self.session.is_authenticated() {
            Decision::Allow
        } else {
            Decision::redirect(LOGIN_PATH)
        }
    }
}

// =============================================================================
// GUEST
// =============================================================================

/// Keeps signed-in users off the login and landing screens.
pub struct GuestGuard {
    session: SessionReader,
}

impl GuestGuard {
    #[must_use]
    pub fn new(session: SessionReader) -> Self {
        Self { session }
    }
}

#[async_trait]
impl NavigationGuard for GuestGuard {
    fn name(&self) -> &'static str {
        "guest"
    }

    async fn check(&self, _ctx: &GuardContext<'_>) -> Decision {
        if self.session.is_authenticated() {
            Decision::redirect(dashboard_or_login(&self.session))
        } else {
            Decision::Allow
        }
    }
}

// =============================================================================
// ROLE
// =============================================================================

/// Capability check layered on top of authentication.
pub struct RoleGuard {
    session: SessionReader,
    allowed: BTreeSet<RoleCode>,
}

impl RoleGuard {
    #[must_use]
    pub fn new(session: SessionReader, allowed: impl IntoIterator<Item = RoleCode>) -> Self {
        Self { session, allowed: allowed.into_iter().collect() }
    }

    #[must_use]
    pub fn allowed_roles(&self) -> &BTreeSet<RoleCode> {
        &self.allowed
    }
}

#[async_trait]
impl NavigationGuard for RoleGuard {
    fn name(&self) -> &'static str {
        "role"
    }

    async fn check(&self, ctx: &GuardContext<'_>) -> Decision {
        let Some(role) = self.session.role() else {
            return Decision::redirect(LOGIN_PATH);
        };
        if self.allowed.contains(&role) {
            return Decision::Allow;
        }
        tracing::debug!(path = %ctx.path, %role, "role not allowed; redirecting to dashboard");
        Decision::redirect(role.dashboard_path())
    }
}
