// src/core/session/store.rs

//! The session store: the single owner of the current identity, the session token and the
//! identity catalog.

use super::storage::{
    KEY_CURRENT, KEY_TOKEN, KEY_USERS, SessionStorage, merge_update, merge_write, read_record,
};
use crate::core::NavGateError;
use crate::core::acl::{Role, SecretHasher, User, UserPatch};
use chrono::Utc;
use rand::RngCore;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 16;

const DEFAULT_USERNAME: &str = "user";
const DEFAULT_DISPLAY_NAME: &str = "New user";

/// Holds the session (current identity + token) and the identity catalog, mirroring every
/// change to a [`SessionStorage`] before it becomes visible in memory.
///
/// A session is either fully present or fully absent: `token` is set if and only if
/// `current` is set.
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    hasher: SecretHasher,
    current: Option<User>,
    token: Option<String>,
    users: Vec<User>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Creates a signed-out store whose catalog starts as `seed_users`.
    /// Call [`hydrate`](Self::hydrate) to pick up previously persisted state.
    pub fn new(storage: S, hasher: SecretHasher, seed_users: Vec<User>) -> Self {
        Self {
            storage,
            hasher,
            current: None,
            token: None,
            users: seed_users,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn hasher(&self) -> &SecretHasher {
        &self.hasher
    }

    /// The signed-in identity, if any.
    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current.as_ref().map(|u| u.role)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// True iff both an identity and a token are present.
    pub fn is_authed(&self) -> bool {
        self.current.is_some() && self.token.is_some()
    }

    /// Restores state from the persisted record.
    ///
    /// Safe to call any number of times. Never fails: a missing record leaves memory as is,
    /// and an unreadable or half-formed one leaves the session absent. A restored session
    /// whose identity has since been disabled in the catalog is dropped.
    pub fn hydrate(&mut self) {
        let record = match read_record(&self.storage) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("No persisted session record, nothing to hydrate.");
                return;
            }
            Err(e) => {
                warn!("Persisted session record is unreadable, treating as signed out: {}", e);
                self.clear_session();
                return;
            }
        };

        if let Some(users) = catalog_of(&record) {
            self.users = users;
        }

        let current = record
            .get(KEY_CURRENT)
            .map(|v| serde_json::from_value::<User>(v.clone()));
        let token = record.get(KEY_TOKEN).map(|v| v.as_str().map(str::to_string));

        match (current, token) {
            (Some(Ok(user)), Some(Some(token))) if !token.is_empty() => {
                match self.find_user(&user.id).cloned() {
                    Some(entry) if !entry.active => {
                        warn!(
                            "Persisted session belongs to disabled identity '{}', dropping it.",
                            user.username
                        );
                        self.clear_session();
                    }
                    // The catalog entry is authoritative for role and profile.
                    Some(entry) => {
                        if entry.role != user.role {
                            info!(
                                "Role of '{}' changed from {} to {} since sign-in.",
                                entry.username, user.role, entry.role
                            );
                        }
                        debug!("Hydrated session for '{}'.", entry.username);
                        self.current = Some(entry);
                        self.token = Some(token);
                    }
                    None => {
                        debug!("Hydrated session for '{}'.", user.username);
                        self.current = Some(user);
                        self.token = Some(token);
                    }
                }
            }
            (None, None) => self.clear_session(),
            _ => {
                warn!("Persisted session is incomplete or malformed, treating as signed out.");
                self.clear_session();
            }
        }
    }

    /// Attempts to sign in.
    ///
    /// Returns `Ok(false)` for an unknown username, a wrong secret and a disabled identity
    /// alike, leaving any existing session untouched. `Err` means the new session could not
    /// be persisted; memory is then unchanged as well.
    pub fn login(&mut self, username: &str, secret: &str) -> Result<bool, NavGateError> {
        self.refresh_catalog();
        let candidate = self
            .users
            .iter()
            .position(|u| u.active && u.username == username);

        let verified = match candidate.and_then(|idx| self.users[idx].password_hash.as_deref()) {
            Some(hash) => self.hasher.verify(secret, hash),
            None => {
                self.hasher.verify_decoy(secret);
                false
            }
        };
        let Some(idx) = candidate.filter(|_| verified) else {
            info!("Login rejected.");
            return Ok(false);
        };

        let now = Utc::now();
        let mut user = self.users[idx].clone();
        user.last_login = Some(now);
        let token = generate_token();

        // Only the session fields and the signed-in entry's `last_login` are written; the
        // rest of the persisted catalog is left exactly as found.
        merge_update(&self.storage, |record| {
            record.insert(KEY_CURRENT.to_string(), serde_json::to_value(&user)?);
            record.insert(KEY_TOKEN.to_string(), Value::String(token.clone()));
            match record.get_mut(KEY_USERS) {
                Some(Value::Array(entries)) => {
                    let stamp = serde_json::to_value(now)?;
                    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
                        if entry.get("id").and_then(Value::as_str) == Some(user.id.as_str()) {
                            entry.insert("last_login".to_string(), stamp.clone());
                        }
                    }
                }
                Some(_) => {
                    warn!("Persisted identity catalog is not a list, leaving it untouched.");
                }
                None => {
                    let mut users = self.users.clone();
                    users[idx].last_login = Some(now);
                    record.insert(KEY_USERS.to_string(), serde_json::to_value(&users)?);
                }
            }
            Ok(())
        })?;

        info!("Login succeeded for '{}' (role {}).", user.username, user.role);
        self.users[idx].last_login = Some(now);
        self.current = Some(user);
        self.token = Some(token);
        Ok(true)
    }

    /// Signs out. The in-memory session is cleared even if persisting the change fails.
    pub fn logout(&mut self) -> Result<(), NavGateError> {
        if let Some(user) = &self.current {
            info!("Logout for '{}'.", user.username);
        }
        self.clear_session();
        merge_write(&self.storage, vec![(KEY_CURRENT, None), (KEY_TOKEN, None)])
    }

    /// Inserts or updates a catalog entry and returns it as stored.
    ///
    /// A patch whose `id` names an existing entry is merged into it. Any other patch creates
    /// a new entry under a freshly generated id, defaulting to the least privileged role and
    /// an active status. An entry created without a secret cannot log in.
    pub fn upsert_user(&mut self, patch: UserPatch) -> Result<User, NavGateError> {
        self.refresh_catalog();
        let existing = patch
            .id
            .as_deref()
            .and_then(|id| self.users.iter().position(|u| u.id == id));

        let username = match (&patch.username, existing) {
            (Some(name), _) => name.trim().to_string(),
            (None, Some(idx)) => self.users[idx].username.clone(),
            (None, None) => DEFAULT_USERNAME.to_string(),
        };
        if username.is_empty() {
            return Err(NavGateError::InvalidRequest(
                "username cannot be empty".to_string(),
            ));
        }
        let taken = self
            .users
            .iter()
            .enumerate()
            .any(|(i, u)| Some(i) != existing && u.username == username);
        if taken {
            return Err(NavGateError::DuplicateUsername(username));
        }

        let password_hash = patch
            .password
            .as_deref()
            .map(|p| self.hasher.hash(p))
            .transpose()?;

        let mut users = self.users.clone();
        let user = match existing {
            Some(idx) => {
                let entry = &mut users[idx];
                entry.username = username;
                if password_hash.is_some() {
                    entry.password_hash = password_hash;
                }
                if let Some(display_name) = patch.display_name {
                    entry.display_name = display_name;
                }
                if let Some(role) = patch.role {
                    entry.role = role;
                }
                if let Some(email) = patch.email {
                    entry.email = email;
                }
                if let Some(active) = patch.active {
                    entry.active = active;
                }
                entry.clone()
            }
            None => {
                let entry = User {
                    id: Uuid::new_v4().to_string(),
                    username,
                    password_hash,
                    display_name: patch
                        .display_name
                        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
                    role: patch.role.unwrap_or(Role::LEAST_PRIVILEGED),
                    email: patch.email.unwrap_or_default(),
                    active: patch.active.unwrap_or(true),
                    last_login: None,
                    created_at: Utc::now(),
                };
                users.push(entry.clone());
                entry
            }
        };

        // Editing the signed-in identity refreshes the live session along with the catalog.
        let is_current = self.current.as_ref().is_some_and(|c| c.id == user.id);
        let mut updates = vec![(KEY_USERS, Some(serde_json::to_value(&users)?))];
        if is_current {
            updates.push((KEY_CURRENT, Some(serde_json::to_value(&user)?)));
        }
        merge_write(&self.storage, updates)?;
        info!(
            "Identity '{}' ({}) {}.",
            user.username,
            user.id,
            if existing.is_some() { "updated" } else { "created" }
        );
        self.users = users;
        if is_current {
            self.current = Some(user.clone());
        }
        Ok(user)
    }

    /// Enables or disables one catalog entry.
    pub fn toggle_user_status(&mut self, id: &str, active: bool) -> Result<(), NavGateError> {
        self.refresh_catalog();
        let Some(idx) = self.users.iter().position(|u| u.id == id) else {
            return Err(NavGateError::UnknownUser(id.to_string()));
        };
        let mut users = self.users.clone();
        users[idx].active = active;
        self.persist_users(&users)?;
        info!(
            "Identity '{}' {}.",
            users[idx].username,
            if active { "enabled" } else { "disabled" }
        );
        self.users = users;
        Ok(())
    }

    fn persist_users(&self, users: &[User]) -> Result<(), NavGateError> {
        merge_write(
            &self.storage,
            vec![(KEY_USERS, Some(serde_json::to_value(users)?))],
        )
    }

    /// Picks up catalog changes persisted by another store since this one last read it.
    fn refresh_catalog(&mut self) {
        match read_record(&self.storage) {
            Ok(Some(record)) => {
                if let Some(users) = catalog_of(&record) {
                    self.users = users;
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Keeping the in-memory catalog, record unreadable: {}", e),
        }
    }

    fn clear_session(&mut self) {
        self.current = None;
        self.token = None;
    }
}

/// The identity catalog held in `record`, if there is a readable one.
fn catalog_of(record: &Map<String, Value>) -> Option<Vec<User>> {
    let users = record.get(KEY_USERS)?;
    match serde_json::from_value::<Vec<User>>(users.clone()) {
        Ok(users) => Some(users),
        Err(e) => {
            warn!(
                "Persisted identity catalog is unreadable, keeping the in-memory catalog: {}",
                e
            );
            None
        }
    }
}

/// A fresh opaque session token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
