// src/core/shell.rs

//! Wires the session store, menu and guards into one object handed to pages.

use crate::config::Config;
use crate::core::NavGateError;
use crate::core::acl::{AllowedRoles, Role, SecretHasher, User};
use crate::core::guard::{InlineGuard, Navigation, RouteGuard};
use crate::core::menu::{MenuTree, filter_for_user, permission_keys};
use crate::core::session::{FileStorage, SessionStorage, SessionStore, seed_catalog};
use anyhow::Context;
use tracing::info;

/// The result of a login attempt made through the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Signed in; navigate to `destination`.
    Accepted { destination: String },
    /// Bad credentials or a disabled identity. Deliberately says nothing more.
    Rejected,
}

/// The navigation shell: the only path through which pages read or change session state.
#[derive(Debug)]
pub struct NavShell<S: SessionStorage> {
    store: SessionStore<S>,
    menu: MenuTree,
    guard: RouteGuard,
}

impl NavShell<FileStorage> {
    /// Builds a shell persisting to the file named in the configuration, and hydrates it.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let hasher = SecretHasher::from_config(&config.security)
            .context("Failed to set up secret hashing")?;
        let users = seed_catalog(&config.seed_users, &hasher)
            .context("Failed to build the seed identity catalog")?;
        let storage = FileStorage::new(&config.storage.path);
        let store = SessionStore::new(storage, hasher, users);
        let guard = RouteGuard::new(config.route_table()?, config.navigation.clone());
        let mut shell = NavShell::new(store, config.menu.clone(), guard);
        shell.store.hydrate();
        info!(
            "Navigation shell ready ({} menu nodes, session {}).",
            shell.menu.walk().len(),
            if shell.store.is_authed() { "restored" } else { "absent" }
        );
        Ok(shell)
    }
}

impl<S: SessionStorage> NavShell<S> {
    pub fn new(store: SessionStore<S>, menu: MenuTree, guard: RouteGuard) -> Self {
        Self { store, menu, guard }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Mutable access for catalog administration (upserts and status toggles).
    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn full_menu(&self) -> &MenuTree {
        &self.menu
    }

    /// The signed-in identity, read-only.
    pub fn current(&self) -> Option<&User> {
        if self.store.is_authed() {
            self.store.current()
        } else {
            None
        }
    }

    /// Runs the route guard for `path`.
    pub fn navigate(&mut self, path: &str) -> Navigation {
        self.guard.check(&mut self.store, path)
    }

    /// Runs the route guard for `path` and follows redirects to the final location.
    pub fn settle(&mut self, path: &str) -> Navigation {
        self.guard.settle(&mut self.store, path)
    }

    /// Signs in and picks the landing location, resuming at `from` when it is reachable.
    pub fn login(
        &mut self,
        username: &str,
        secret: &str,
        from: Option<&str>,
    ) -> Result<LoginOutcome, NavGateError> {
        if !self.store.login(username, secret)? {
            return Ok(LoginOutcome::Rejected);
        }
        let destination = self.guard.resume(&self.store, from);
        Ok(LoginOutcome::Accepted { destination })
    }

    /// Signs out and returns the login location.
    pub fn logout(&mut self) -> Result<String, NavGateError> {
        self.store.logout()?;
        Ok(self.guard.paths().login_path.clone())
    }

    /// The menu pruned for whoever is signed in.
    pub fn menu(&self) -> MenuTree {
        filter_for_user(&self.menu, self.current())
    }

    /// The permission keys of `role`, derived from the menu annotations.
    pub fn permissions(&self, role: Role) -> Vec<String> {
        permission_keys(&self.menu, role)
    }

    /// Whether a fragment declared for `roles` would render right now.
    pub fn shows(&self, roles: Option<AllowedRoles>) -> bool {
        InlineGuard::new(roles).permits(self.current())
    }
}
