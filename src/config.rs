// src/config.rs

//! Manages configuration: loading, defaulting and validation.

use crate::core::acl::Role;
use crate::core::guard::{RouteNode, RouteTable, default_routes};
use crate::core::menu::{MenuNode, MenuTree, default_menu};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use tracing::warn;

/// Where the session record is persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> String {
    "navgate_data/session.json".to_string()
}

/// The well-known locations the route guard redirects to.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    /// Where unauthenticated callers are sent.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Where authenticated but unauthorized callers are sent.
    #[serde(default = "default_default_path")]
    pub default_path: String,
    /// Where a fresh login lands when there is nothing to resume.
    #[serde(default = "default_post_login_path")]
    pub post_login_path: String,
    /// If true, a login resumes at the location that triggered the login redirect.
    #[serde(default = "default_resume_after_login")]
    pub resume_after_login: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            default_path: default_default_path(),
            post_login_path: default_post_login_path(),
            resume_after_login: default_resume_after_login(),
        }
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}
fn default_default_path() -> String {
    "/dashboard".to_string()
}
fn default_post_login_path() -> String {
    "/station-select".to_string()
}
fn default_resume_after_login() -> bool {
    true
}

/// Argon2 cost parameters for newly hashed secrets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_argon2_memory_kib() -> u32 {
    19 * 1024 // 19 MiB
}
fn default_argon2_iterations() -> u32 {
    2
}
fn default_argon2_parallelism() -> u32 {
    1
}

/// A catalog entry seeded at first run. Secrets are given as argon2 PHC strings only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_seed_role")]
    pub role: Role,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_seed_active")]
    pub active: bool,
}

fn default_seed_role() -> Role {
    Role::LEAST_PRIVILEGED
}
fn default_seed_active() -> bool {
    true
}

/// A raw representation of the config file before validation and resolution.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    navigation: NavigationConfig,
    #[serde(default)]
    security: SecurityConfig,
    #[serde(default)]
    seed_users: Vec<SeedUser>,
    #[serde(default)]
    menu: Option<Vec<MenuNode>>,
    #[serde(default)]
    routes: Option<Vec<RouteNode>>,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Represents the final, validated configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub log_level: String,
    pub storage: StorageConfig,
    pub navigation: NavigationConfig,
    pub security: SecurityConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_users: Vec<SeedUser>,
    /// The resolved menu tree: the configured one, or the built-in catalog.
    pub menu: MenuTree,
    /// The configured route table, or the built-in one.
    pub routes: Vec<RouteNode>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            storage: StorageConfig::default(),
            navigation: NavigationConfig::default(),
            security: SecurityConfig::default(),
            seed_users: Vec::new(),
            menu: default_menu(),
            routes: default_routes(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid configuration in '{path}'"))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw_config: RawConfig =
            toml::from_str(contents).context("Failed to parse configuration TOML")?;

        let menu = match raw_config.menu {
            Some(nodes) => MenuTree::new(nodes).context("invalid [[menu]] configuration")?,
            None => default_menu(),
        };

        let config = Config {
            log_level: raw_config.log_level,
            storage: raw_config.storage,
            navigation: raw_config.navigation,
            security: raw_config.security,
            seed_users: raw_config.seed_users,
            menu,
            routes: raw_config.routes.unwrap_or_else(default_routes),
        };

        config.validate()?;
        Ok(config)
    }

    /// Builds the route table, binding routes to their menu nodes.
    pub fn route_table(&self) -> Result<RouteTable> {
        RouteTable::new(self.routes.clone(), &self.menu).context("invalid [[routes]] configuration")
    }

    /// Validates the resolved configuration to ensure logical consistency.
    fn validate(&self) -> Result<()> {
        if self.storage.path.trim().is_empty() {
            return Err(anyhow!("storage.path cannot be empty"));
        }

        let nav = &self.navigation;
        for (name, value) in [
            ("navigation.login_path", &nav.login_path),
            ("navigation.default_path", &nav.default_path),
            ("navigation.post_login_path", &nav.post_login_path),
        ] {
            if !value.starts_with('/') {
                return Err(anyhow!("{name} must be an absolute path, got '{value}'"));
            }
        }
        if nav.login_path == nav.default_path {
            return Err(anyhow!(
                "navigation.login_path and navigation.default_path cannot be the same"
            ));
        }

        let sec = &self.security;
        argon2::Params::new(
            sec.argon2_memory_kib,
            sec.argon2_iterations,
            sec.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow!("invalid [security] argon2 parameters: {e}"))?;
        if sec.argon2_memory_kib < 8 * 1024 {
            warn!(
                "low security.argon2_memory_kib setting: {} KiB. Secrets are cheap to brute-force.",
                sec.argon2_memory_kib
            );
        }

        let mut usernames = HashSet::new();
        for (i, seed) in self.seed_users.iter().enumerate() {
            if seed.username.trim().is_empty() {
                return Err(anyhow!("seed user #{} has an empty username", i + 1));
            }
            if !usernames.insert(seed.username.as_str()) {
                return Err(anyhow!("seed username '{}' appears more than once", seed.username));
            }
            if let Some(hash) = &seed.password_hash
                && argon2::PasswordHash::new(hash).is_err()
            {
                return Err(anyhow!(
                    "seed user '{}' has a password_hash that is not a PHC string",
                    seed.username
                ));
            }
        }

        self.route_table()?;
        Ok(())
    }
}
