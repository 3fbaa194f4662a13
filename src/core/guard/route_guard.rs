// src/core/guard/route_guard.rs

//! The gate every navigation passes through.

use super::routes::RouteTable;
use crate::config::NavigationConfig;
use crate::core::acl::User;
use crate::core::session::{SessionStorage, SessionStore};
use tracing::{debug, warn};

/// Upper bound on redirects followed by [`RouteGuard::settle`].
const MAX_REDIRECTS: usize = 8;

/// Why a navigation was redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// Protected destination, nobody signed in.
    Unauthenticated,
    /// Signed in, but the destination does not admit the caller's role.
    Unauthorized,
    /// Guest-only destination (the login page) while signed in.
    AlreadySignedIn,
    /// The destination itself is an alias for another location.
    Alias,
    /// Nothing in the route table matched.
    NotFound,
}

/// The outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render {
        path: String,
    },
    Redirect {
        to: String,
        /// The location originally asked for, kept so login can resume there.
        from: Option<String>,
        reason: RedirectReason,
    },
}

impl Navigation {
    pub fn is_render(&self) -> bool {
        matches!(self, Navigation::Render { .. })
    }

    /// The location the caller ends up at after this step.
    pub fn location(&self) -> &str {
        match self {
            Navigation::Render { path } => path,
            Navigation::Redirect { to, .. } => to,
        }
    }
}

/// Where a caller stands relative to one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unauthenticated,
    Authorized,
    Unauthorized,
}

/// Decides, per navigation, whether to render or where to redirect.
///
/// Unauthorized callers are sent to the default landing rather than shown a denial.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    routes: RouteTable,
    paths: NavigationConfig,
}

impl RouteGuard {
    pub fn new(routes: RouteTable, paths: NavigationConfig) -> Self {
        Self { routes, paths }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn paths(&self) -> &NavigationConfig {
        &self.paths
    }

    /// Hydrates the store, then decides the navigation to `path`.
    pub fn check<S: SessionStorage>(&self, store: &mut SessionStore<S>, path: &str) -> Navigation {
        store.hydrate();
        self.decide(signed_in(store), path)
    }

    /// Like [`check`](Self::check), but follows redirects until something renders.
    ///
    /// A redirected navigation comes back as a `Redirect` whose `to` is the final rendered
    /// location, with the `from` and `reason` of the first hop. If a later hop is the one
    /// that sends the caller to login, its `from` and `reason` win, so login can resume there.
    pub fn settle<S: SessionStorage>(&self, store: &mut SessionStore<S>, path: &str) -> Navigation {
        store.hydrate();
        let current = signed_in(store);
        let (mut to, mut from, mut reason) = match self.decide(current, path) {
            Navigation::Redirect { to, from, reason } => (to, from, reason),
            rendered => return rendered,
        };
        for _ in 0..MAX_REDIRECTS {
            match self.decide(current, &to) {
                Navigation::Render { path } => {
                    return Navigation::Redirect {
                        to: path,
                        from,
                        reason,
                    };
                }
                Navigation::Redirect {
                    to: next,
                    from: hop_from,
                    reason: hop_reason,
                } => {
                    if hop_reason == RedirectReason::Unauthenticated
                        && reason != RedirectReason::Unauthenticated
                    {
                        from = hop_from;
                        reason = hop_reason;
                    }
                    to = next;
                }
            }
        }
        warn!("Redirect loop while navigating to '{}'", path);
        Navigation::Redirect { to, from, reason }
    }

    /// The guard's state for the current caller and `path`, without side effects on the store.
    pub fn state<S: SessionStorage>(&self, store: &SessionStore<S>, path: &str) -> GuardState {
        match signed_in(store) {
            None => GuardState::Unauthenticated,
            Some(user) => match self.routes.resolve(path) {
                Some(matched) if !matched.admits(user.role) => GuardState::Unauthorized,
                _ => GuardState::Authorized,
            },
        }
    }

    /// Where to go right after a successful login: the remembered location if it renders
    /// for the new identity, otherwise the post-login landing.
    pub fn resume<S: SessionStorage>(&self, store: &SessionStore<S>, from: Option<&str>) -> String {
        let fallback = || self.paths.post_login_path.clone();
        if !self.paths.resume_after_login {
            return fallback();
        }
        let Some(from) = from else {
            return fallback();
        };
        match self.decide(signed_in(store), from) {
            Navigation::Render { .. }
            | Navigation::Redirect {
                reason: RedirectReason::Alias,
                ..
            } => from.to_string(),
            _ => fallback(),
        }
    }

    /// The pure decision, given who is signed in.
    pub fn decide(&self, current: Option<&User>, path: &str) -> Navigation {
        let Some(matched) = self.routes.resolve(path) else {
            debug!("No route for '{}', redirecting to '{}'", path, self.paths.default_path);
            return self.redirect(&self.paths.default_path, None, RedirectReason::NotFound);
        };

        if matched.is_protected() {
            let Some(user) = current else {
                debug!("Unauthenticated navigation to '{}', redirecting to login", path);
                return self.redirect(
                    &self.paths.login_path,
                    Some(path),
                    RedirectReason::Unauthenticated,
                );
            };
            if !matched.admits(user.role) {
                debug!(
                    "Role {} may not open '{}' (requires {}), redirecting to '{}'",
                    user.role,
                    path,
                    matched.required_roles(),
                    self.paths.default_path
                );
                return self.redirect(&self.paths.default_path, None, RedirectReason::Unauthorized);
            }
        } else if matched.is_guest_only() && current.is_some() {
            return self.redirect(
                &self.paths.post_login_path,
                None,
                RedirectReason::AlreadySignedIn,
            );
        }

        if let Some(to) = matched.redirect() {
            return self.redirect(to, None, RedirectReason::Alias);
        }

        Navigation::Render {
            path: path.to_string(),
        }
    }

    fn redirect(&self, to: &str, from: Option<&str>, reason: RedirectReason) -> Navigation {
        Navigation::Redirect {
            to: to.to_string(),
            from: from.map(str::to_string),
            reason,
        }
    }
}

fn signed_in<S: SessionStorage>(store: &SessionStore<S>) -> Option<&User> {
    if store.is_authed() { store.current() } else { None }
}
