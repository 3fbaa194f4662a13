// src/core/menu/catalog.rs

//! The built-in navigation catalog of the energy monitoring dashboard.

use super::tree::{MenuNode, MenuTree};
use crate::core::acl::{AllowedRoles, Role};

fn admins() -> AllowedRoles {
    AllowedRoles::only([Role::SuperAdmin, Role::Admin])
}

fn admins_and(extra: &[Role]) -> AllowedRoles {
    AllowedRoles::only([Role::SuperAdmin, Role::Admin].into_iter().chain(extra.iter().copied()))
}

/// The default menu tree, used when the configuration does not supply one.
pub fn default_menu() -> MenuTree {
    let analysts = || admins_and(&[Role::Operator, Role::Viewer]);
    let nodes = vec![
        MenuNode::new("dashboard", "Home", "/dashboard").with_roles(AllowedRoles::Any),
        MenuNode::new("analysis", "Energy analysis", "/analysis").with_children(vec![
            MenuNode::new("analysis-single", "Single-station analysis", "/analysis/single")
                .with_roles(analysts()),
            MenuNode::new("analysis-ratio", "Consumption breakdown", "/analysis/ratio")
                .with_roles(analysts()),
        ]),
        MenuNode::new("alerts", "Energy alerts", "/alerts")
            .with_roles(admins_and(&[Role::Operator, Role::Viewer, Role::Auditor])),
        MenuNode::new("compare", "Multi-station comparison", "/compare").with_roles(analysts()),
        MenuNode::new("strategy", "Saving strategy simulation", "/strategy").with_roles(admins()),
        MenuNode::new("devices", "Device management", "/devices")
            .with_roles(admins_and(&[Role::Operator])),
        MenuNode::new("system", "System", "/system").with_children(vec![
            MenuNode::new("system-overview", "Overview", "/system/overview").with_roles(admins()),
            MenuNode::new("system-users", "Users", "/system/users").with_roles(admins()),
            MenuNode::new("system-roles", "Roles", "/system/roles").with_roles(admins()),
            MenuNode::new("system-matrix", "Permission matrix", "/system/matrix")
                .with_roles(admins_and(&[Role::Auditor])),
            MenuNode::new("system-menus", "Menus", "/system/menus").with_roles(admins()),
            MenuNode::new("system-settings", "Settings", "/system/settings").with_roles(admins()),
            MenuNode::new("system-logs", "Operation logs", "/system/logs")
                .with_roles(admins_and(&[Role::Auditor])),
        ]),
    ];
    MenuTree::from_validated(nodes)
}
