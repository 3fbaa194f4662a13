// src/core/acl/role.rs

//! The closed role vocabulary and the role annotation attached to menu nodes and routes.

use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use tracing::warn;

/// The marker that opens an annotation to every authenticated identity.
pub const WILDCARD: &str = "*";

/// One of the fixed authorization levels. Exactly one is assigned to each identity.
///
/// Declaration order runs from most to least privileged among the administrative roles;
/// `Auditor` is a side role with read access to audit surfaces only.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Operator,
    Viewer,
    Auditor,
}

impl Role {
    /// The role given to identities created without an explicit one.
    pub const LEAST_PRIVILEGED: Role = Role::Viewer;

    /// A short human description, shown by role management surfaces.
    pub fn description(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "full access to every destination",
            Role::Admin => "administrative access",
            Role::Operator => "day-to-day operations and device management",
            Role::Viewer => "read-only access to analysis pages",
            Role::Auditor => "access to alerts, permission matrix and operation logs",
        }
    }
}

/// The set of roles allowed to reach a destination.
///
/// An absent annotation and an annotation containing [`WILDCARD`] are the same thing: any
/// authenticated identity is admitted. Whether an unauthenticated caller is admitted is
/// decided by the component consulting the annotation, not by the annotation itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedRoles {
    #[default]
    Any,
    Only(BTreeSet<Role>),
}

impl AllowedRoles {
    /// Restricts a destination to the given roles.
    pub fn only<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        AllowedRoles::Only(roles.into_iter().collect())
    }

    /// Parses a free-form annotation as it appears in configuration.
    ///
    /// Unknown role names are dropped with a warning, so an annotation made entirely of
    /// stale names admits no one.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name == WILDCARD {
                return AllowedRoles::Any;
            }
            match Role::from_str(name) {
                Ok(role) => {
                    roles.insert(role);
                }
                Err(_) => warn!(r#"Ignoring unknown role "{}" in role annotation"#, name),
            }
        }
        AllowedRoles::Only(roles)
    }

    /// True if the annotation lets the given role through.
    pub fn admits(&self, role: Role) -> bool {
        match self {
            AllowedRoles::Any => true,
            AllowedRoles::Only(roles) => roles.contains(&role),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, AllowedRoles::Any)
    }
}

impl fmt::Display for AllowedRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedRoles::Any => f.write_str(WILDCARD),
            AllowedRoles::Only(roles) => {
                let names: Vec<&str> = roles.iter().map(|r| r.as_ref()).collect();
                write!(f, "{}", names.join(","))
            }
        }
    }
}

impl Serialize for AllowedRoles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AllowedRoles::Any => {
                let mut seq = serializer.serialize_seq(Some(1))?;
                seq.serialize_element(WILDCARD)?;
                seq.end()
            }
            AllowedRoles::Only(roles) => {
                let mut seq = serializer.serialize_seq(Some(roles.len()))?;
                for role in roles {
                    seq.serialize_element(role.as_ref())?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for AllowedRoles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(AllowedRoles::from_names(names))
    }
}
