// tests/integration/persistence_test.rs

//! Integration tests for the file-backed session record: restart hydration,
//! atomic replacement and merge-write behavior on disk.

use super::test_helpers::{cheap_hasher, persisted, standard_users};
use navgate::NavShell;
use navgate::config::Config;
use navgate::core::acl::UserPatch;
use navgate::core::session::{FileStorage, SessionStorage, SessionStore};
use std::fs;
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> SessionStore<FileStorage> {
    let storage = FileStorage::new(dir.path().join("state").join("session.json"));
    SessionStore::new(storage, cheap_hasher(), standard_users())
}

fn cheap_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.path = dir
        .path()
        .join("session.json")
        .to_string_lossy()
        .into_owned();
    config.security.argon2_memory_kib = 8;
    config.security.argon2_iterations = 1;
    config
}

#[test]
fn test_missing_file_loads_as_nothing() {
    let dir = TempDir::new().unwrap();
    let storage = FileStorage::new(dir.path().join("absent.json"));
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn test_save_creates_parent_directories_and_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);
    assert!(store.login("bob", "pw1").unwrap());

    let state_dir = dir.path().join("state");
    let entries: Vec<String> = fs::read_dir(&state_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["session.json".to_string()]);

    let record = persisted(store.storage());
    assert_eq!(record["current"]["username"], "bob");
}

#[test]
fn test_restart_restores_session_from_file() {
    let dir = TempDir::new().unwrap();
    let token = {
        let mut store = file_store(&dir);
        store.login("audrey", "audit").unwrap();
        store.token().unwrap().to_string()
    };

    let mut store = file_store(&dir);
    assert!(!store.is_authed());
    store.hydrate();
    assert!(store.is_authed());
    assert_eq!(store.token(), Some(token.as_str()));
    assert_eq!(store.current().unwrap().username, "audrey");
}

#[test]
fn test_logout_is_not_resurrected_after_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = file_store(&dir);
        store.login("bob", "pw1").unwrap();
        store.logout().unwrap();
    }
    let mut store = file_store(&dir);
    store.hydrate();
    assert!(!store.is_authed());
}

#[test]
fn test_catalog_changes_survive_restart() {
    let dir = TempDir::new().unwrap();
    let created_id = {
        let mut store = file_store(&dir);
        store.toggle_user_status("2", false).unwrap();
        store
            .upsert_user(UserPatch::new().username("frank").password("fr4nk"))
            .unwrap()
            .id
    };

    let mut store = file_store(&dir);
    store.hydrate();
    assert!(!store.find_user("2").unwrap().active);
    assert_eq!(store.find_user(&created_id).unwrap().username, "frank");
    assert!(!store.login("bob", "pw1").unwrap());
    assert!(store.login("frank", "fr4nk").unwrap());
}

#[test]
fn test_corrupt_file_fails_closed_and_is_replaced_on_write() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);
    let path = store.storage().path().to_path_buf();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ this is not json").unwrap();

    store.hydrate();
    assert!(!store.is_authed());

    assert!(store.login("olga", "ops").unwrap());
    let record = persisted(store.storage());
    assert_eq!(record["current"]["username"], "olga");
}

#[test]
fn test_plaintext_secrets_never_reach_disk() {
    let dir = TempDir::new().unwrap();
    let mut store = file_store(&dir);
    store.login("admin", "admin123").unwrap();
    store
        .upsert_user(UserPatch::new().with_id("2").password("n3w-s3cret"))
        .unwrap();

    let contents = fs::read_to_string(store.storage().path()).unwrap();
    assert!(!contents.contains("\"admin123\""));
    assert!(!contents.contains("n3w-s3cret"));
    assert!(contents.contains("$argon2id$"));
}

#[test]
fn test_shell_from_config_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = cheap_config(&dir);

    let mut shell = NavShell::from_config(&config).unwrap();
    assert!(shell.current().is_none());
    shell.login("user1", "user123", None).unwrap();

    let restarted = NavShell::from_config(&config).unwrap();
    assert_eq!(restarted.current().unwrap().username, "user1");
    assert!(restarted.menu().find("devices").is_some());
}
