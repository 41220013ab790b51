//! Process-wide client state.
//!
//! DESIGN
//! ======
//! State is split by concern (`session`, `loading`) so guards and pipeline
//! stages depend only on the small handle they need.

pub mod loading;
pub mod session;

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::session::SessionStore;
    use crate::net::types::{RoleCode, User};

    /// Create a user with the given role and a predictable id.
    #[must_use]
    pub fn user(role: RoleCode) -> User {
        User {
            id: format!("{}-1", role.as_str().to_ascii_lowercase()),
            email: format!("{}@clinic.test", role.as_str().to_ascii_lowercase()),
            first_name: Some("Test".into()),
            last_name: Some(role.as_str().to_owned()),
            role,
        }
    }

    /// Session store already holding a user with `role`.
    #[must_use]
    pub fn signed_in(role: RoleCode) -> SessionStore {
        let store = SessionStore::new();
        store.set(user(role));
        store
    }
}
