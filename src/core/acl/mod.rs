// src/core/acl/mod.rs

//! Roles, identities and secret handling.

pub mod role;
pub mod secret;
pub mod user;

pub use role::{AllowedRoles, Role, WILDCARD};
pub use secret::SecretHasher;
pub use user::{User, UserPatch};
