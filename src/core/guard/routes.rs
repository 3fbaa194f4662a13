// src/core/guard/routes.rs

//! The nested route table consulted by the route guard.

use crate::core::NavGateError;
use crate::core::acl::{AllowedRoles, Role};
use crate::core::menu::MenuTree;
use serde::{Deserialize, Serialize};

/// Segment that matches the whole remainder of a path.
const CATCH_ALL: &str = "*";

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteNode {
    /// Path relative to the parent route, e.g. `"analysis/single"`. `"/"` or an empty string
    /// consumes nothing; a trailing `"*"` consumes the rest of the location.
    #[serde(default)]
    pub path: String,
    /// An index route renders when its parent is matched exactly.
    #[serde(default)]
    pub index: bool,
    /// Role metadata. `None` means open to any authenticated identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<AllowedRoles>,
    /// Borrows the role metadata of this menu node instead of declaring its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu_key: Option<String>,
    /// Reachable without signing in. A chain is protected unless every node on it is public.
    #[serde(default)]
    pub public: bool,
    /// Only for signed-out callers; signed-in callers are sent to the post-login landing.
    #[serde(default)]
    pub guest_only: bool,
    /// Renders as a redirect to this absolute location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn index() -> Self {
        Self {
            index: true,
            ..Default::default()
        }
    }

    pub fn with_roles(mut self, roles: AllowedRoles) -> Self {
        self.roles = Some(roles);
        self
    }

    pub fn for_menu(mut self, key: impl Into<String>) -> Self {
        self.menu_key = Some(key.into());
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn guest_only(mut self) -> Self {
        self.guest_only = true;
        self
    }

    pub fn redirect_to(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn with_children(mut self, children: Vec<RouteNode>) -> Self {
        self.children = children;
        self
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

/// The chain of routes matched for one location, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub chain: Vec<&'a RouteNode>,
}

impl<'a> RouteMatch<'a> {
    /// The most specific matched route.
    pub fn leaf(&self) -> &'a RouteNode {
        self.chain[self.chain.len() - 1]
    }

    pub fn is_protected(&self) -> bool {
        self.chain.iter().any(|node| !node.public)
    }

    pub fn is_guest_only(&self) -> bool {
        self.chain.iter().any(|node| node.guest_only)
    }

    /// The roles required by the leaf. Ancestors' metadata does not apply.
    pub fn required_roles(&self) -> AllowedRoles {
        self.leaf().roles.clone().unwrap_or_default()
    }

    pub fn admits(&self, role: Role) -> bool {
        self.leaf().roles.as_ref().is_none_or(|roles| roles.admits(role))
    }

    pub fn redirect(&self) -> Option<&'a str> {
        self.leaf().redirect.as_deref()
    }
}

/// An ordered, validated route tree. Sibling routes are tried in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteTable {
    routes: Vec<RouteNode>,
}

impl RouteTable {
    /// Validates `routes` and resolves every `menu_key` against `menu`.
    pub fn new(mut routes: Vec<RouteNode>, menu: &MenuTree) -> Result<Self, NavGateError> {
        for route in routes.iter_mut() {
            bind(route, menu)?;
        }
        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[RouteNode] {
        &self.routes
    }

    /// Matches a location against the table. Query strings and fragments are ignored.
    pub fn resolve(&self, location: &str) -> Option<RouteMatch<'_>> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut chain = Vec::new();
        if match_routes(&self.routes, &segments, &mut chain) {
            Some(RouteMatch { chain })
        } else {
            None
        }
    }
}

fn bind(route: &mut RouteNode, menu: &MenuTree) -> Result<(), NavGateError> {
    if let Some(key) = &route.menu_key {
        if route.roles.is_some() {
            return Err(NavGateError::InvalidRoute(format!(
                "route '{}' declares roles and also borrows them from menu node '{}'",
                route.path, key
            )));
        }
        let node = menu.find(key).ok_or_else(|| {
            NavGateError::InvalidRoute(format!(
                "route '{}' refers to unknown menu node '{}'",
                route.path, key
            ))
        })?;
        route.roles = Some(node.roles.clone());
    }
    if let Some(to) = &route.redirect
        && !to.starts_with('/')
    {
        return Err(NavGateError::InvalidRoute(format!(
            "route '{}' redirects to relative location '{}'",
            route.path, to
        )));
    }
    if route.index && (!route.path.is_empty() || !route.children.is_empty()) {
        return Err(NavGateError::InvalidRoute(
            "index routes cannot have a path or children".to_string(),
        ));
    }
    let segments: Vec<&str> = route.segments().collect();
    if let Some(pos) = segments.iter().position(|s| *s == CATCH_ALL)
        && pos + 1 != segments.len()
    {
        return Err(NavGateError::InvalidRoute(format!(
            "route '{}' has '*' before its last segment",
            route.path
        )));
    }
    for child in route.children.iter_mut() {
        bind(child, menu)?;
    }
    Ok(())
}

fn match_routes<'a>(
    routes: &'a [RouteNode],
    segments: &[&str],
    chain: &mut Vec<&'a RouteNode>,
) -> bool {
    for route in routes.iter().filter(|r| !r.index) {
        let Some(rest) = consume(route, segments) else {
            continue;
        };
        chain.push(route);
        if rest.is_empty() {
            if let Some(index) = route.children.iter().find(|c| c.index) {
                chain.push(index);
            }
            return true;
        }
        if match_routes(&route.children, rest, chain) {
            return true;
        }
        chain.pop();
    }
    false
}

/// Strips the route's own segments off the front of `segments`.
fn consume<'s, 'x>(route: &RouteNode, segments: &'s [&'x str]) -> Option<&'s [&'x str]> {
    let mut i = 0;
    for pattern in route.segments() {
        if pattern == CATCH_ALL {
            return Some(&segments[segments.len()..]);
        }
        if segments.get(i) != Some(&pattern) {
            return None;
        }
        i += 1;
    }
    Some(&segments[i..])
}

/// The built-in route table of the dashboard. Destinations borrow their role metadata from
/// the menu node of the same destination, so the two cannot drift apart.
pub fn default_routes() -> Vec<RouteNode> {
    vec![
        RouteNode::new("/login").public().guest_only(),
        RouteNode::new("/station-select"),
        RouteNode::new("/").with_children(vec![
            RouteNode::index().redirect_to("/dashboard"),
            RouteNode::new("dashboard").for_menu("dashboard"),
            RouteNode::new("analysis/single").for_menu("analysis-single"),
            RouteNode::new("analysis/ratio").for_menu("analysis-ratio"),
            RouteNode::new("alerts").for_menu("alerts"),
            RouteNode::new("compare").for_menu("compare"),
            RouteNode::new("strategy").for_menu("strategy"),
            RouteNode::new("devices").for_menu("devices"),
            RouteNode::new("system").with_children(vec![
                RouteNode::index().redirect_to("/system/overview"),
                RouteNode::new("overview").for_menu("system-overview"),
                RouteNode::new("users").for_menu("system-users"),
                RouteNode::new("roles").for_menu("system-roles"),
                RouteNode::new("matrix").for_menu("system-matrix"),
                RouteNode::new("menus").for_menu("system-menus"),
                RouteNode::new("settings").for_menu("system-settings"),
                RouteNode::new("logs").for_menu("system-logs"),
            ]),
        ]),
        RouteNode::new("*").public().redirect_to("/"),
    ]
}
