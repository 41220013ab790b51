//! Route table and path matching.
//!
//! DESIGN
//! ======
//! Each entry owns a path prefix, the screen it commits to, its authorization
//! descriptor and the guards derived from that descriptor. Matching is by
//! whole path segments and the longest prefix wins; `/` matches only itself.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use super::guards::{AuthenticatedGuard, GuestGuard, NavigationGuard, RoleGuard};
use crate::net::types::RoleCode;
use crate::state::session::SessionReader;

pub const LOGIN_PATH: &str = "/auth/login";

/// Route authorization descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// No guard at all.
    Public,
    /// Only visitors without a session.
    GuestOnly,
    /// Signed-in users; `roles: None` means any role.
    Authenticated { roles: Option<BTreeSet<RoleCode>> },
}

pub struct RouteEntry {
    prefix: String,
    screen: &'static str,
    access: RouteAccess,
    guards: Vec<Arc<dyn NavigationGuard>>,
}

impl RouteEntry {
    /// Entry with guards derived from `access`.
    #[must_use]
    pub fn new(prefix: &str, screen: &'static str, access: RouteAccess, session: &SessionReader) -> Self {
        let guards: Vec<Arc<dyn NavigationGuard>> = match &access {
            RouteAccess::Public => Vec::new(),
            RouteAccess::GuestOnly => vec![Arc::new(GuestGuard::new(session.clone()))],
            RouteAccess::Authenticated { roles: None } => {
                vec![Arc::new(AuthenticatedGuard::new(session.clone()))]
            }
            RouteAccess::Authenticated { roles: Some(roles) } => vec![
                Arc::new(AuthenticatedGuard::new(session.clone())),
                Arc::new(RoleGuard::new(session.clone(), roles.iter().copied())),
            ],
        };
        Self { prefix: normalize_path(prefix), screen, access, guards }
    }

    /// Append a guard evaluated after the descriptor-derived ones.
    #[must_use]
    pub fn with_guard(mut self, guard: impl NavigationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn screen(&self) -> &'static str {
        self.screen
    }

    #[must_use]
    pub fn access(&self) -> &RouteAccess {
        &self.access
    }

    #[must_use]
    pub fn guards(&self) -> &[Arc<dyn NavigationGuard>] {
        &self.guards
    }

    #[must_use]
    pub fn guard_names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|guard| guard.name()).collect()
    }

    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path == "/";
        }
        path_has_prefix(path, &self.prefix)
    }
}

pub struct RouteTable {
    entries: Vec<RouteEntry>,
    fallback: String,
}

impl RouteTable {
    /// Empty table; unmatched paths redirect to `fallback`.
    #[must_use]
    pub fn new(fallback: &str) -> Self {
        Self { entries: Vec::new(), fallback: normalize_path(fallback) }
    }

    /// The clinic portal's route tree.
    #[must_use]
    pub fn standard(session: &SessionReader) -> Self {
        let role = |role: RoleCode| RouteAccess::Authenticated { roles: Some(BTreeSet::from([role])) };

        Self::new(LOGIN_PATH)
            .route(RouteEntry::new("/", "landing", RouteAccess::GuestOnly, session))
            .route(RouteEntry::new("/search", "search", RouteAccess::GuestOnly, session))
            .route(RouteEntry::new(LOGIN_PATH, "login", RouteAccess::GuestOnly, session))
            .route(RouteEntry::new("/auth/register", "register", RouteAccess::GuestOnly, session))
            .route(RouteEntry::new("/auth/reset-password", "reset-password", RouteAccess::GuestOnly, session))
            .route(RouteEntry::new("/admin", "admin-dashboard", role(RoleCode::Admin), session))
            .route(RouteEntry::new("/doctor", "doctor-dashboard", role(RoleCode::Doctor), session))
            .route(RouteEntry::new("/staff", "staff-dashboard", role(RoleCode::Staff), session))
            .route(RouteEntry::new("/patient", "patient-dashboard", role(RoleCode::Patient), session))
            .route(RouteEntry::new("/account", "account", RouteAccess::Authenticated { roles: None }, session))
    }

    #[must_use]
    pub fn route(mut self, entry: RouteEntry) -> Self {
        self.entries.push(entry);
        self
    }

    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Longest matching entry for an already normalised path.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.matches(path))
            .max_by_key(|entry| entry.prefix.len())
    }
}

/// Strip query and fragment, force a leading `/`, drop trailing `/`.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_owned();
    }
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// True when `path` equals `prefix` or continues it with a new segment.
#[must_use]
pub fn path_has_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
