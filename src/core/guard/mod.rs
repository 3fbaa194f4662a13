// src/core/guard/mod.rs

//! Route-level and fragment-level access gates.

pub mod inline;
pub mod route_guard;
pub mod routes;

pub use inline::InlineGuard;
pub use route_guard::{GuardState, Navigation, RedirectReason, RouteGuard};
pub use routes::{RouteMatch, RouteNode, RouteTable, default_routes};
