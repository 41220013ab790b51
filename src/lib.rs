//! # clinic-portal
//!
//! Session-derived access control for the clinic scheduling client.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router evaluates navigation guards against the session store before a
//! screen is committed. Every backend call goes through the request pipeline,
//! whose stages track in-flight requests for the loading indicator and react
//! to expired sessions by clearing the store and requesting a login redirect.
//!
//! ```text
//! Router::navigate -> guards (SessionReader / SessionCheck) -> Navigation
//! AuthGateway -> Pipeline [AuthErrorStage, LoadingStage] -> Transport
//!                     \-> NavigationQueue -> Router::drain_requests
//! ```

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod state;

pub use app::Portal;
pub use config::{ConfigError, PortalConfig};
pub use net::api::AuthGateway;
pub use net::types::{ApiError, RoleCode, User};
pub use router::{Navigation, NavigationError, Router};
pub use state::loading::LoadingState;
pub use state::session::{SessionReader, SessionStore};
