// src/core/menu/mod.rs

//! The static menu tree, its built-in catalog and the role-based filter over it.

pub mod catalog;
pub mod filter;
pub mod tree;

pub use catalog::default_menu;
pub use filter::{filter_for_user, filter_menu, permission_keys, role_permissions};
pub use tree::{MenuNode, MenuTree};
