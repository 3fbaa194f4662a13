// src/core/session/seed.rs

//! The identity catalog a store starts from before anything has been persisted.

use crate::config::SeedUser;
use crate::core::NavGateError;
use crate::core::acl::{Role, SecretHasher, User};
use chrono::Utc;
use uuid::Uuid;

/// Demo identities: (id, username, secret, display name, role, email).
const DEMO_USERS: &[(&str, &str, &str, &str, Role, &str)] = &[
    ("1", "admin", "admin123", "Administrator", Role::SuperAdmin, "admin@navgate.local"),
    ("2", "user1", "user123", "Operations specialist", Role::Operator, "user1@navgate.local"),
    ("3", "audit1", "audit123", "Auditor", Role::Auditor, "audit@navgate.local"),
];

/// Builds the demo catalog, hashing each demo secret.
pub fn demo_users(hasher: &SecretHasher) -> Result<Vec<User>, NavGateError> {
    let now = Utc::now();
    DEMO_USERS
        .iter()
        .map(|(id, username, secret, display_name, role, email)| {
            Ok(User {
                id: id.to_string(),
                username: username.to_string(),
                password_hash: Some(hasher.hash(secret)?),
                display_name: display_name.to_string(),
                role: *role,
                email: email.to_string(),
                active: true,
                last_login: None,
                created_at: now,
            })
        })
        .collect()
}

/// Turns configured seed entries into catalog entries, or falls back to the demo catalog
/// when none are configured.
pub fn seed_catalog(seeds: &[SeedUser], hasher: &SecretHasher) -> Result<Vec<User>, NavGateError> {
    if seeds.is_empty() {
        return demo_users(hasher);
    }
    let now = Utc::now();
    Ok(seeds
        .iter()
        .map(|seed| User {
            id: seed.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
            username: seed.username.clone(),
            password_hash: seed.password_hash.clone(),
            display_name: seed
                .display_name
                .clone()
                .unwrap_or_else(|| seed.username.clone()),
            role: seed.role,
            email: seed.email.clone(),
            active: seed.active,
            last_login: None,
            created_at: now,
        })
        .collect())
}
