//! Networking modules for backend calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the auth gateway, `pipeline` wraps every call with the
//! cross-cutting stages, `transport` performs the HTTP exchange and `types`
//! defines the shared wire schema.

pub mod api;
pub mod pipeline;
pub mod transport;
pub mod types;

// =============================================================================
// TEST HELPERS
// =============================================================================
