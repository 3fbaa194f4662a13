// tests/integration/shell_test.rs

//! End-to-end flows through the navigation shell: login, guarded navigation,
//! menu rendering and catalog administration.

use super::test_helpers::{TestContext, standard_users};
use navgate::LoginOutcome;
use navgate::core::acl::{AllowedRoles, Role, UserPatch};
use navgate::core::guard::{Navigation, RedirectReason};

#[test]
fn test_guest_is_bounced_to_login_then_resumes() {
    let mut ctx = TestContext::new();

    let nav = ctx.shell.navigate("/compare");
    let Navigation::Redirect { to, from, reason } = nav.clone() else {
        panic!("expected a redirect, got {nav:?}");
    };
    assert_eq!(to, "/login");
    assert_eq!(reason, RedirectReason::Unauthenticated);
    assert!(ctx.menu_keys().is_empty());

    let outcome = ctx.shell.login("bob", "pw1", from.as_deref()).unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Accepted {
            destination: "/compare".to_string()
        }
    );
    assert!(ctx.shell.navigate("/compare").is_render());
}

#[test]
fn test_login_without_origin_lands_on_station_select() {
    let mut ctx = TestContext::new();
    let outcome = ctx.shell.login("olga", "ops", None).unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Accepted {
            destination: "/station-select".to_string()
        }
    );
}

#[test]
fn test_rejected_login_reveals_nothing() {
    let mut ctx = TestContext::new();
    assert_eq!(
        ctx.shell.login("ghost", "boo", None).unwrap(),
        LoginOutcome::Rejected
    );
    assert_eq!(
        ctx.shell.login("bob", "bad", None).unwrap(),
        LoginOutcome::Rejected
    );
    assert!(ctx.shell.current().is_none());
}

#[test]
fn test_menu_follows_signed_in_role() {
    let mut ctx = TestContext::new();

    ctx.shell.login("bob", "pw1", None).unwrap();
    let viewer_menu = ctx.menu_keys();
    assert!(viewer_menu.contains(&"compare".to_string()));
    assert!(!viewer_menu.contains(&"devices".to_string()));
    assert!(!viewer_menu.contains(&"strategy".to_string()));

    ctx.shell.login("admin", "admin123", None).unwrap();
    assert_eq!(ctx.shell.menu(), *ctx.shell.full_menu());

    ctx.shell.logout().unwrap();
    assert!(ctx.shell.menu().is_empty());
}

#[test]
fn test_every_visible_leaf_is_navigable() {
    let mut ctx = TestContext::new();
    for (username, secret) in [
        ("admin", "admin123"),
        ("adele", "adm"),
        ("olga", "ops"),
        ("bob", "pw1"),
        ("audrey", "audit"),
    ] {
        ctx.shell.login(username, secret, None).unwrap();
        let menu = ctx.shell.menu();
        for node in menu.walk().into_iter().filter(|n| n.is_leaf()) {
            if node.path == "/system" || node.path == "/analysis" {
                continue;
            }
            assert_eq!(
                ctx.shell.navigate(&node.path),
                Navigation::Render {
                    path: node.path.clone()
                },
                "{username} sees {} in the menu but cannot open it",
                node.path
            );
        }
    }
}

#[test]
fn test_hidden_destinations_are_not_navigable() {
    let mut ctx = TestContext::new();
    ctx.shell.login("audrey", "audit", None).unwrap();
    let visible = ctx.menu_keys();
    let hidden: Vec<String> = ctx
        .shell
        .full_menu()
        .walk()
        .into_iter()
        .filter(|n| n.is_leaf() && !visible.contains(&n.key))
        .map(|n| n.path.clone())
        .collect();
    assert!(!hidden.is_empty());
    for path in hidden {
        assert_eq!(
            ctx.shell.navigate(&path),
            Navigation::Redirect {
                to: "/dashboard".to_string(),
                from: None,
                reason: RedirectReason::Unauthorized
            }
        );
    }
}

#[test]
fn test_logout_returns_login_path_and_locks_routes() {
    let mut ctx = TestContext::new();
    ctx.shell.login("admin", "admin123", None).unwrap();
    assert_eq!(ctx.shell.logout().unwrap(), "/login");
    assert!(!ctx.shell.navigate("/dashboard").is_render());
    assert!(ctx.shell.navigate("/login").is_render());
}

#[test]
fn test_session_survives_restart_over_same_storage() {
    let mut ctx = TestContext::new();
    ctx.shell.login("olga", "ops", None).unwrap();

    let restarted = ctx.restart(Vec::new());
    assert_eq!(restarted.current().unwrap().username, "olga");
    assert_eq!(restarted.current().unwrap().role, Role::Operator);
}

#[test]
fn test_disabling_signed_in_identity_ends_session_on_next_navigation() {
    let mut ctx = TestContext::new();
    ctx.shell.login("olga", "ops", None).unwrap();
    ctx.shell.store_mut().toggle_user_status("3", false).unwrap();

    let nav = ctx.shell.navigate("/devices");
    assert_eq!(nav.location(), "/login");
    assert!(ctx.shell.current().is_none());
}

#[test]
fn test_created_identity_can_sign_in() {
    let mut ctx = TestContext::new();
    let created = ctx
        .shell
        .store_mut()
        .upsert_user(
            UserPatch::new()
                .username("carol")
                .password("c4rol")
                .role(Role::Auditor),
        )
        .unwrap();
    assert_eq!(ctx.shell.store().users().len(), standard_users().len() + 1);

    ctx.shell.login("carol", "c4rol", None).unwrap();
    assert_eq!(ctx.shell.current().unwrap().id, created.id);
    assert!(ctx.shell.navigate("/system/logs").is_render());
}

#[test]
fn test_inline_fragments_follow_role() {
    let mut ctx = TestContext::new();
    let admins_only = Some(AllowedRoles::only([Role::Admin, Role::SuperAdmin]));

    assert!(ctx.shell.shows(None));
    assert!(!ctx.shell.shows(admins_only.clone()));

    ctx.shell.login("adele", "adm", None).unwrap();
    assert!(ctx.shell.shows(admins_only.clone()));

    ctx.shell.login("bob", "pw1", None).unwrap();
    assert!(!ctx.shell.shows(admins_only));
    assert!(ctx.shell.shows(Some(AllowedRoles::Any)));
}

#[test]
fn test_permissions_follow_menu() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.shell.permissions(Role::Auditor),
        vec!["dashboard", "alerts", "system-matrix", "system-logs"]
    );
}
