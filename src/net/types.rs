//! Wire schema shared by the gateway, the pipeline and the guards.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. `RoleCode` is the only
//! authorization input; everything a guard needs is derived from it.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLES
// =============================================================================

/// Fixed classification of the authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleCode {
    Admin,
    Doctor,
    Patient,
    Staff,
}

impl RoleCode {
    pub const ALL: [Self; 4] = [Self::Admin, Self::Doctor, Self::Patient, Self::Staff];

    /// Canonical landing route for this role.
    #[must_use]
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Doctor => "/doctor",
            Self::Staff => "/staff",
            Self::Patient => "/patient",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Doctor => "DOCTOR",
            Self::Patient => "PATIENT",
            Self::Staff => "STAFF",
        }
    }
}

impl fmt::Display for RoleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown role code: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for RoleCode {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "DOCTOR" => Ok(Self::Doctor),
            "PATIENT" => Ok(Self::Patient),
            "STAFF" => Ok(Self::Staff),
            _ => Err(UnknownRole(raw.to_owned())),
        }
    }
}

// =============================================================================
// USER
// =============================================================================

/// Authenticated user as returned by `/users/login` and `/users/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(rename = "roleCode")]
    pub role: RoleCode,
}

impl User {
    #[must_use]
    pub fn dashboard_path(&self) -> &'static str {
        self.role.dashboard_path()
    }

    /// "First Last" when both are known, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

// =============================================================================
// REQUEST PAYLOADS
// =============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pesel: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls. The pipeline returns them unchanged.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status { status: u16, body: String },

    /// A request payload could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
