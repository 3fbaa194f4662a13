// src/core/menu/tree.rs

//! The hierarchical catalog of navigable destinations.

use crate::core::NavGateError;
use crate::core::acl::AllowedRoles;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A navigable entry. Nodes with children are groups; nodes without are destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Stable key, unique across the whole tree.
    pub key: String,
    pub label: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuNode>,
    #[serde(default, skip_serializing_if = "AllowedRoles::is_any")]
    pub roles: AllowedRoles,
}

impl MenuNode {
    pub fn new(key: impl Into<String>, label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            path: path.into(),
            children: Vec::new(),
            roles: AllowedRoles::Any,
        }
    }

    pub fn with_roles(mut self, roles: AllowedRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_children(mut self, children: Vec<MenuNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An ordered forest of [`MenuNode`]s. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuTree {
    nodes: Vec<MenuNode>,
}

impl MenuTree {
    /// Builds a tree, rejecting empty keys, relative paths and duplicate keys.
    pub fn new(nodes: Vec<MenuNode>) -> Result<Self, NavGateError> {
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Wraps nodes that are already known to be valid, such as the output of a filter.
    pub(crate) fn from_validated(nodes: Vec<MenuNode>) -> Self {
        Self { nodes }
    }

    fn validate(&self) -> Result<(), NavGateError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&MenuNode> = self.nodes.iter().collect();
        while let Some(node) = stack.pop() {
            if node.key.trim().is_empty() {
                return Err(NavGateError::InvalidMenu(format!(
                    "node '{}' has an empty key",
                    node.label
                )));
            }
            if !node.path.starts_with('/') {
                return Err(NavGateError::InvalidMenu(format!(
                    "node '{}' has a relative path '{}'",
                    node.key, node.path
                )));
            }
            if !seen.insert(node.key.as_str()) {
                return Err(NavGateError::DuplicateMenuKey(node.key.clone()));
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in depth-first pre-order.
    pub fn walk(&self) -> Vec<&MenuNode> {
        fn visit<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a MenuNode>) {
            for node in nodes {
                out.push(node);
                visit(&node.children, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.nodes, &mut out);
        out
    }

    /// Keys of every node in depth-first pre-order.
    pub fn keys(&self) -> Vec<&str> {
        self.walk().into_iter().map(|n| n.key.as_str()).collect()
    }

    pub fn find(&self, key: &str) -> Option<&MenuNode> {
        self.walk().into_iter().find(|n| n.key == key)
    }

    /// Resolves a menu key to the path it navigates to.
    pub fn find_path(&self, key: &str) -> Option<&str> {
        self.find(key).map(|n| n.path.as_str())
    }

    /// The key chain from the root down to the node whose path equals `path`,
    /// used to highlight the active entry and expand its group. Empty if nothing matches.
    pub fn selected_keys(&self, path: &str) -> Vec<String> {
        fn search(nodes: &[MenuNode], path: &str) -> Vec<String> {
            for node in nodes {
                if node.path == path {
                    return vec![node.key.clone()];
                }
                let below = search(&node.children, path);
                if !below.is_empty() {
                    let mut chain = Vec::with_capacity(below.len() + 1);
                    chain.push(node.key.clone());
                    chain.extend(below);
                    return chain;
                }
            }
            Vec::new()
        }
        search(&self.nodes, path)
    }
}
