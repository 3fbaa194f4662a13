// src/core/errors.rs

//! Defines the primary error type for the entire crate.

use std::sync::Arc;
use thiserror::Error;

/// The main error enum, representing every failure the navigation core can report.
///
/// Authentication outcomes are never errors: a rejected login is `Ok(false)`. An error
/// here always means persistence or validation went wrong.
#[derive(Error, Debug)]
pub enum NavGateError {
    #[error("IO Error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("No identity with id '{0}'")]
    UnknownUser(String),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Menu key '{0}' appears more than once")]
    DuplicateMenuKey(String),

    #[error("Invalid menu: {0}")]
    InvalidMenu(String),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

// Manual implementation of Clone because `std::io::Error` is not cloneable.
impl Clone for NavGateError {
    fn clone(&self) -> Self {
        match self {
            NavGateError::Io(e) => NavGateError::Io(Arc::clone(e)),
            NavGateError::Storage(s) => NavGateError::Storage(s.clone()),
            NavGateError::Serialization(s) => NavGateError::Serialization(s.clone()),
            NavGateError::PasswordHash(s) => NavGateError::PasswordHash(s.clone()),
            NavGateError::InvalidRequest(s) => NavGateError::InvalidRequest(s.clone()),
            NavGateError::UnknownUser(s) => NavGateError::UnknownUser(s.clone()),
            NavGateError::DuplicateUsername(s) => NavGateError::DuplicateUsername(s.clone()),
            NavGateError::DuplicateMenuKey(s) => NavGateError::DuplicateMenuKey(s.clone()),
            NavGateError::InvalidMenu(s) => NavGateError::InvalidMenu(s.clone()),
            NavGateError::InvalidRoute(s) => NavGateError::InvalidRoute(s.clone()),
        }
    }
}

impl PartialEq for NavGateError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NavGateError::Io(e1), NavGateError::Io(e2)) => e1.to_string() == e2.to_string(),
            (NavGateError::Storage(s1), NavGateError::Storage(s2)) => s1 == s2,
            (NavGateError::Serialization(s1), NavGateError::Serialization(s2)) => s1 == s2,
            (NavGateError::PasswordHash(s1), NavGateError::PasswordHash(s2)) => s1 == s2,
            (NavGateError::InvalidRequest(s1), NavGateError::InvalidRequest(s2)) => s1 == s2,
            (NavGateError::UnknownUser(s1), NavGateError::UnknownUser(s2)) => s1 == s2,
            (NavGateError::DuplicateUsername(s1), NavGateError::DuplicateUsername(s2)) => {
                s1 == s2
            }
            (NavGateError::DuplicateMenuKey(s1), NavGateError::DuplicateMenuKey(s2)) => s1 == s2,
            (NavGateError::InvalidMenu(s1), NavGateError::InvalidMenu(s2)) => s1 == s2,
            (NavGateError::InvalidRoute(s1), NavGateError::InvalidRoute(s2)) => s1 == s2,
            _ => false,
        }
    }
}

// --- From trait implementations for easy error conversion ---

impl From<std::io::Error> for NavGateError {
    fn from(e: std::io::Error) -> Self {
        NavGateError::Io(Arc::new(e))
    }
}

impl From<serde_json::Error> for NavGateError {
    fn from(e: serde_json::Error) -> Self {
        NavGateError::Serialization(format!("JSON serialization/deserialization error: {e}"))
    }
}

impl From<argon2::password_hash::Error> for NavGateError {
    fn from(e: argon2::password_hash::Error) -> Self {
        NavGateError::PasswordHash(e.to_string())
    }
}

impl From<argon2::Error> for NavGateError {
    fn from(e: argon2::Error) -> Self {
        NavGateError::PasswordHash(e.to_string())
    }
}
