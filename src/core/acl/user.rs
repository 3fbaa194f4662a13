// src/core/acl/user.rs

use super::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a single identity in the catalog.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique, stable identifier.
    pub id: String,
    /// The login name.
    pub username: String,
    /// The Argon2 hash of the identity's secret. `None` means no credential is set
    /// and the identity cannot log in.
    #[serde(default)]
    pub password_hash: Option<String>,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub email: String,
    /// Identities are never deleted; disabling one flips this flag.
    pub active: bool,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A partial identity used by catalog upserts. Fields left `None` keep their current
/// value on update or take their default on insert.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub id: Option<String>,
    pub username: Option<String>,
    /// Plaintext secret; hashed before it reaches the catalog.
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl UserPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}
