// src/core/mod.rs

//! The central module containing the authorization and session logic of NavGate.

pub mod acl;
pub mod errors;
pub mod guard;
pub mod menu;
pub mod session;
pub mod shell;

pub use errors::NavGateError;
pub use shell::{LoginOutcome, NavShell};
