// src/core/menu/filter.rs

//! Prunes the menu tree down to what a role may see.
//!
//! Evaluation is gate-before-recurse: a node is tested first, and only an admitted node has
//! its children filtered. An excluded node takes its whole subtree with it, even if some
//! descendant's annotation would admit the role on its own.

use super::tree::{MenuNode, MenuTree};
use crate::core::acl::{Role, User};
use strum::IntoEnumIterator;

/// Returns a new tree holding only the nodes visible to `role`.
/// `None` stands for an unauthenticated caller, who sees nothing.
pub fn filter_menu(tree: &MenuTree, role: Option<Role>) -> MenuTree {
    match role {
        Some(role) => MenuTree::from_validated(prune(tree.nodes(), role)),
        None => MenuTree::default(),
    }
}

/// [`filter_menu`] for whoever is currently signed in.
pub fn filter_for_user(tree: &MenuTree, current: Option<&User>) -> MenuTree {
    filter_menu(tree, current.map(|u| u.role))
}

fn prune(nodes: &[MenuNode], role: Role) -> Vec<MenuNode> {
    nodes
        .iter()
        .filter(|node| node.roles.admits(role))
        .map(|node| MenuNode {
            key: node.key.clone(),
            label: node.label.clone(),
            path: node.path.clone(),
            children: prune(&node.children, role),
            roles: node.roles.clone(),
        })
        .collect()
}

/// The ordered permission keys of a role, derived from the menu annotations.
///
/// These are the keys of the source tree's destinations (nodes without children) that
/// survive [`filter_menu`] for `role`. A group whose children are all filtered away does not
/// count as a destination.
pub fn permission_keys(tree: &MenuTree, role: Role) -> Vec<String> {
    fn collect(nodes: &[MenuNode], role: Role, out: &mut Vec<String>) {
        for node in nodes.iter().filter(|n| n.roles.admits(role)) {
            if node.is_leaf() {
                out.push(node.key.clone());
            } else {
                collect(&node.children, role, out);
            }
        }
    }
    let mut out = Vec::new();
    collect(tree.nodes(), role, &mut out);
    out
}

/// The permission key list of every role, in role declaration order.
pub fn role_permissions(tree: &MenuTree) -> Vec<(Role, Vec<String>)> {
    Role::iter()
        .map(|role| (role, permission_keys(tree, role)))
        .collect()
}
