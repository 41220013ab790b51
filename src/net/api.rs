//! Auth gateway: the backend calls that establish, check and end a session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway is the only writer of the session store. Login and session
//! check populate it; logout clears it; every other outcome leaves it alone.
//! All calls go through the shared pipeline, so a 401 on any of them also
//! triggers the auth-error stage.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use super::pipeline::Pipeline;
use super::transport::ApiRequest;
use super::types::{ApiError, LoginRequest, PasswordResetRequest, RegistrationRequest, RoleCode, User};
use crate::state::session::{SessionReader, SessionStore};

pub const LOGIN_ENDPOINT: &str = "/users/login";
pub const LOGOUT_ENDPOINT: &str = "/users/logout";
pub const REGISTER_ENDPOINT: &str = "/users/register";
pub const RESET_PASSWORD_ENDPOINT: &str = "/users/resetpassword";
pub const CURRENT_USER_ENDPOINT: &str = "/users/me";

/// Pure role → dashboard mapping.
#[must_use]
pub fn dashboard_path_for(role: RoleCode) -> &'static str {
    role.dashboard_path()
}

/// Capability used by the bootstrap guard to validate the backend session.
#[async_trait]
pub trait SessionCheck: Send + Sync {
    async fn check_session_status(&self) -> Result<User, ApiError>;
}

pub struct AuthGateway {
    pipeline: Arc<Pipeline>,
    store: SessionStore,
}

impl AuthGateway {
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, store: SessionStore) -> Self {
        Self { pipeline, store }
    }

    /// Shared pipeline for domain calls issued by screens.
    #[must_use]
    pub fn pipeline(&self) -> Arc<Pipeline> {
        Arc::clone(&self.pipeline)
    }

    #[must_use]
    pub fn session(&self) -> SessionReader {
        self.store.reader()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.reader().is_authenticated()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.store.reader().current_user()
    }

    /// `POST /users/login`. Populates the session on success.
    ///
    /// When the login response carries no user record, the session is
    /// resolved with a follow-up `GET /users/me`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error; the session is not modified.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let payload = serde_json::to_value(LoginRequest { email, password })
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        let response = self.pipeline.send(ApiRequest::post(LOGIN_ENDPOINT, payload)).await?;

        match response.json::<User>() {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = %user.role, "logged in");
                self.store.set(user.clone());
                Ok(user)
            }
            Err(_) => {
                tracing::debug!("login response has no user record; checking session");
                self.check_session_status().await
            }
        }
    }

    /// `POST /users/register`.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn register_user(&self, payload: &RegistrationRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.pipeline.send(ApiRequest::post(REGISTER_ENDPOINT, body)).await?;
        tracing::info!(email = %payload.email, "registration submitted");
        Ok(())
    }

    /// `GET /users/resetpassword?address=<email>`: ask for a reset email.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn reset_password_request(&self, email: &str) -> Result<(), ApiError> {
        let request = ApiRequest::get(RESET_PASSWORD_ENDPOINT).with_query("address", email);
        self.pipeline.send(request).await?;
        tracing::info!(%email, "password reset requested");
        Ok(())
    }

    /// `POST /users/resetpassword`: complete a reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error.
    pub async fn reset_password_with_token(&self, payload: &PasswordResetRequest) -> Result<(), ApiError> {
        let body = serde_json::to_value(payload).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.pipeline.send(ApiRequest::post(RESET_PASSWORD_ENDPOINT, body)).await?;
        tracing::info!("password reset completed");
        Ok(())
    }

    /// `GET /users/me`. Populates the session on success.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error. The gateway does not clear the
    /// session here; a 401 is handled by the auth-error stage.
    pub async fn check_session_status(&self) -> Result<User, ApiError> {
        let response = self.pipeline.send(ApiRequest::get(CURRENT_USER_ENDPOINT)).await?;
        let user = response.json::<User>()?;
        tracing::debug!(user_id = %user.id, role = %user.role, "session confirmed");
        self.store.set(user.clone());
        Ok(user)
    }

    /// `POST /users/logout`. The local session is cleared even if the call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error after clearing the session.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.pipeline.send(ApiRequest::new(Method::POST, LOGOUT_ENDPOINT)).await;
        if let Some(user) = self.store.clear() {
            tracing::info!(user_id = %user.id, "logged out");
        }
        result.map(|_| ())
    }
}

#[async_trait]
impl SessionCheck for AuthGateway {
    async fn check_session_status(&self) -> Result<User, ApiError> {
        AuthGateway::check_session_status(self).await
    }
}
