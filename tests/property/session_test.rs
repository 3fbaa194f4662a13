// tests/property/session_test.rs

//! Property-based tests for the session store: login outcomes, logout durability,
//! hydration idempotence and non-destructive catalog writes.

use crate::test_helpers::{cheap_hasher, memory_store, persisted};
use chrono::Utc;
use navgate::core::acl::{Role, SecretHasher, User};
use navgate::core::session::{MemoryStorage, SessionStore};
use proptest::prelude::*;
use std::sync::OnceLock;
use strum::IntoEnumIterator;

/// Hashing is the expensive part of every case, so each distinct secret is hashed once.
fn hash_of(secret: &str) -> String {
    static HASHES: OnceLock<std::sync::Mutex<Vec<(String, String)>>> = OnceLock::new();
    let cache = HASHES.get_or_init(Default::default);
    let mut cache = cache.lock().unwrap();
    if let Some((_, hash)) = cache.iter().find(|(s, _)| s == secret) {
        return hash.clone();
    }
    let hash = cheap_hasher().hash(secret).unwrap();
    cache.push((secret.to_string(), hash.clone()));
    hash
}

#[derive(Debug, Clone)]
struct Account {
    secret: String,
    role: Role,
    active: bool,
}

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::iter().collect::<Vec<_>>())
}

fn any_accounts() -> impl Strategy<Value = Vec<Account>> {
    prop::collection::vec(
        ("(alpha|beta|gamma|delta)", any_role(), any::<bool>()).prop_map(
            |(secret, role, active)| Account {
                secret,
                role,
                active,
            },
        ),
        1..6,
    )
}

fn catalog(accounts: &[Account]) -> Vec<User> {
    accounts
        .iter()
        .enumerate()
        .map(|(i, a)| User {
            id: i.to_string(),
            username: format!("user{i}"),
            password_hash: Some(hash_of(&a.secret)),
            display_name: format!("User {i}"),
            role: a.role,
            email: String::new(),
            active: a.active,
            last_login: None,
            created_at: Utc::now(),
        })
        .collect()
}

fn snapshot(store: &SessionStore<MemoryStorage>) -> (Option<User>, Option<String>, Vec<User>) {
    (
        store.current().cloned(),
        store.token().map(str::to_string),
        store.users().to_vec(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_login_succeeds_iff_active_and_secret_matches(
        accounts in any_accounts(),
        pick in any::<prop::sample::Index>(),
        attempt in "(alpha|beta|gamma|delta)",
    ) {
        let (mut store, _) = memory_store(catalog(&accounts));
        let i = pick.index(accounts.len());
        let account = &accounts[i];

        let ok = store.login(&format!("user{i}"), &attempt).unwrap();
        prop_assert_eq!(ok, account.active && attempt == account.secret);
        prop_assert_eq!(store.is_authed(), ok);
        if ok {
            prop_assert_eq!(store.current_role(), Some(account.role));
        }
    }

    #[test]
    fn test_logout_is_never_resurrected(
        accounts in any_accounts(),
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut store, storage) = memory_store(catalog(&accounts));
        let i = pick.index(accounts.len());
        let _ = store.login(&format!("user{i}"), &accounts[i].secret).unwrap();

        store.logout().unwrap();
        prop_assert!(!store.is_authed());
        store.hydrate();
        prop_assert!(!store.is_authed());

        let hasher = SecretHasher::new(8, 1, 1).unwrap();
        let mut restarted = SessionStore::new(storage, hasher, Vec::new());
        restarted.hydrate();
        prop_assert!(!restarted.is_authed());
    }

    #[test]
    fn test_hydrate_twice_equals_hydrate_once(
        accounts in any_accounts(),
        pick in any::<prop::sample::Index>(),
        logout in any::<bool>(),
    ) {
        let (mut store, storage) = memory_store(catalog(&accounts));
        let i = pick.index(accounts.len());
        let _ = store.login(&format!("user{i}"), &accounts[i].secret).unwrap();
        if logout {
            store.logout().unwrap();
        }

        let mut fresh = SessionStore::new(storage, cheap_hasher(), Vec::new());
        fresh.hydrate();
        let first = snapshot(&fresh);
        fresh.hydrate();
        prop_assert_eq!(first, snapshot(&fresh));
    }

    #[test]
    fn test_toggle_preserves_session_fields(
        accounts in any_accounts(),
        pick in any::<prop::sample::Index>(),
        target in any::<prop::sample::Index>(),
        active in any::<bool>(),
    ) {
        let (mut store, storage) = memory_store(catalog(&accounts));
        let i = pick.index(accounts.len());
        let _ = store.login(&format!("user{i}"), &accounts[i].secret).unwrap();
        let before = storage.contents().map(|_| persisted(&storage));

        let t = target.index(accounts.len());
        store.toggle_user_status(&t.to_string(), active).unwrap();
        let after = persisted(&storage);

        let users = after["users"].as_array().unwrap();
        prop_assert_eq!(&users[t]["active"], &serde_json::Value::Bool(active));
        if let Some(before) = before {
            prop_assert_eq!(&after["current"], &before["current"]);
            prop_assert_eq!(&after["token"], &before["token"]);
        } else {
            prop_assert!(after.get("current").is_none());
            prop_assert!(after.get("token").is_none());
        }
    }
}
