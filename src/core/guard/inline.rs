// src/core/guard/inline.rs

//! Conditional rendering of page fragments by role.

use crate::core::acl::{AllowedRoles, Role, User};

/// A stateless render-time check wrapping one fragment of a page.
///
/// Without a role list, or with a wildcard one, the fragment is shown to everyone,
/// signed in or not. Otherwise it is shown only to a signed-in identity whose role is
/// listed. No hydration and no navigation happen here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineGuard {
    roles: Option<AllowedRoles>,
}

impl InlineGuard {
    pub fn new(roles: Option<AllowedRoles>) -> Self {
        Self { roles }
    }

    /// A guard restricted to `roles`.
    pub fn roles<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        Self::new(Some(AllowedRoles::only(roles)))
    }

    /// A guard parsed from role names as a page would declare them, wildcard included.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(Some(AllowedRoles::from_names(names)))
    }

    pub fn permits(&self, current: Option<&User>) -> bool {
        match &self.roles {
            None | Some(AllowedRoles::Any) => true,
            Some(roles) => current.is_some_and(|user| roles.admits(user.role)),
        }
    }

    /// The fragment if permitted, otherwise nothing.
    pub fn render<T>(&self, current: Option<&User>, content: impl FnOnce() -> T) -> Option<T> {
        self.permits(current).then(content)
    }

    /// The fragment if permitted, otherwise the fallback.
    pub fn render_or<T>(
        &self,
        current: Option<&User>,
        content: impl FnOnce() -> T,
        fallback: impl FnOnce() -> T,
    ) -> T {
        if self.permits(current) {
            content()
        } else {
            fallback()
        }
    }
}
