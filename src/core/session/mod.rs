// src/core/session/mod.rs

//! Session state, its persistence medium and the seed catalog.

pub mod seed;
pub mod storage;
pub mod store;

pub use seed::{demo_users, seed_catalog};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::SessionStore;
