// tests/property/menu_filter_test.rs

//! Property-based tests for the menu filter over randomly generated trees.

use navgate::core::acl::{AllowedRoles, Role};
use navgate::core::menu::{MenuNode, MenuTree, filter_menu, permission_keys};
use proptest::prelude::*;
use strum::IntoEnumIterator;

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::iter().collect::<Vec<_>>())
}

fn any_annotation() -> impl Strategy<Value = AllowedRoles> {
    prop_oneof![
        1 => Just(AllowedRoles::Any),
        3 => prop::collection::btree_set(any_role(), 0..4).prop_map(AllowedRoles::Only),
    ]
}

/// A nested shape of annotations; keys and paths are assigned afterwards so they stay unique.
#[derive(Debug, Clone)]
struct Shape {
    roles: AllowedRoles,
    children: Vec<Shape>,
}

fn any_shape() -> impl Strategy<Value = Vec<Shape>> {
    let leaf = any_annotation().prop_map(|roles| Shape {
        roles,
        children: Vec::new(),
    });
    let shape = leaf.prop_recursive(3, 24, 4, |inner| {
        (any_annotation(), prop::collection::vec(inner, 0..4))
            .prop_map(|(roles, children)| Shape { roles, children })
    });
    prop::collection::vec(shape, 0..5)
}

fn build(shapes: &[Shape], prefix: &str, next: &mut usize) -> Vec<MenuNode> {
    shapes
        .iter()
        .map(|shape| {
            *next += 1;
            let key = format!("n{next}");
            let path = format!("{prefix}/{key}");
            let children = build(&shape.children, &path, next);
            MenuNode::new(key.clone(), key, path)
                .with_roles(shape.roles.clone())
                .with_children(children)
        })
        .collect()
}

fn any_tree() -> impl Strategy<Value = MenuTree> {
    any_shape().prop_map(|shapes| {
        let mut next = 0;
        MenuTree::new(build(&shapes, "", &mut next)).expect("generated keys are unique")
    })
}

/// True if every node on the way from a root down to `key` admits `role`.
fn chain_admits(nodes: &[MenuNode], key: &str, role: Role) -> Option<bool> {
    for node in nodes {
        if node.key == key {
            return Some(node.roles.admits(role));
        }
        if let Some(below) = chain_admits(&node.children, key, role) {
            return Some(below && node.roles.admits(role));
        }
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_node_survives_iff_whole_ancestor_chain_admits(tree in any_tree(), role in any_role()) {
        let filtered = filter_menu(&tree, Some(role));
        for node in tree.walk() {
            let kept = filtered.find(&node.key).is_some();
            let admitted = chain_admits(tree.nodes(), &node.key, role).unwrap_or(false);
            prop_assert_eq!(kept, admitted, "node {} for role {}", node.key, role);
        }
    }

    #[test]
    fn test_filter_keeps_relative_order(tree in any_tree(), role in any_role()) {
        let filtered = filter_menu(&tree, Some(role));
        let source: Vec<&str> = tree.keys();
        let kept: Vec<&str> = filtered.keys();
        let projected: Vec<&str> = source.iter().copied().filter(|k| kept.contains(k)).collect();
        prop_assert_eq!(kept, projected);
    }

    #[test]
    fn test_filter_is_idempotent(tree in any_tree(), role in any_role()) {
        let once = filter_menu(&tree, Some(role));
        let twice = filter_menu(&once, Some(role));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_unauthenticated_sees_nothing(tree in any_tree()) {
        prop_assert!(filter_menu(&tree, None).is_empty());
    }

    #[test]
    fn test_permission_keys_are_surviving_source_leaves(tree in any_tree(), role in any_role()) {
        let filtered = filter_menu(&tree, Some(role));
        let keys = permission_keys(&tree, role);
        for key in &keys {
            let source = tree.find(key).expect("permission key names a source node");
            prop_assert!(source.is_leaf());
            prop_assert!(filtered.find(key).is_some());
        }
        let expected = tree
            .walk()
            .into_iter()
            .filter(|n| n.is_leaf() && filtered.find(&n.key).is_some())
            .count();
        prop_assert_eq!(keys.len(), expected);
    }

    #[test]
    fn test_wildcard_tree_is_unchanged_for_every_role(shapes in any_shape(), role in any_role()) {
        fn open(shapes: &[Shape]) -> Vec<Shape> {
            shapes
                .iter()
                .map(|s| Shape { roles: AllowedRoles::Any, children: open(&s.children) })
                .collect()
        }
        let mut next = 0;
        let tree = MenuTree::new(build(&open(&shapes), "", &mut next)).unwrap();
        prop_assert_eq!(filter_menu(&tree, Some(role)), tree);
    }
}
