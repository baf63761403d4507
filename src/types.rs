/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mutating operations that flow through the observer pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Verb recorded in the audit log
    pub fn audit_action(&self) -> &'static str {
        match self {
            Operation::Create => "created",
            Operation::Update => "updated",
            Operation::Delete => "deleted",
        }
    }
}

/// User roles. Every role except `admin` and `national` is scoped to one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    National,
    Annual,
    District,
    Local,
}

impl Role {
    pub const ALL: &'static [Role] = &[
        Role::Admin,
        Role::National,
        Role::Annual,
        Role::District,
        Role::Local,
    ];

    /// Name of the user field holding the scope reference for this role
    pub fn scope_field(&self) -> Option<&'static str> {
        match self {
            Role::Annual => Some("annual"),
            Role::District => Some("district"),
            Role::Local => Some("localChurch"),
            Role::Admin | Role::National => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::National => "national",
            Role::Annual => "annual",
            Role::District => "district",
            Role::Local => "local",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display identifier layout: `{prefix}-{seq padded to width}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdFormat {
    pub counter_key: &'static str,
    pub prefix: &'static str,
    pub width: usize,
}

/// Persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    AnnualConferences,
    Districts,
    LocalChurches,
    Memberships,
    Ministries,
    Families,
    Councils,
    Attendances,
    Histories,
    Users,
    Logs,
}

impl Collection {
    pub const ALL: &'static [Collection] = &[
        Collection::AnnualConferences,
        Collection::Districts,
        Collection::LocalChurches,
        Collection::Memberships,
        Collection::Ministries,
        Collection::Families,
        Collection::Councils,
        Collection::Attendances,
        Collection::Histories,
        Collection::Users,
        Collection::Logs,
    ];

    /// Table / collection name in the store
    pub fn name(&self) -> &'static str {
        match self {
            Collection::AnnualConferences => "annual_conferences",
            Collection::Districts => "districts",
            Collection::LocalChurches => "local_churches",
            Collection::Memberships => "memberships",
            Collection::Ministries => "ministries",
            Collection::Families => "families",
            Collection::Councils => "councils",
            Collection::Attendances => "attendances",
            Collection::Histories => "histories",
            Collection::Users => "users",
            Collection::Logs => "logs",
        }
    }

    /// Human readable label used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Collection::AnnualConferences => "Annual Conference",
            Collection::Districts => "District",
            Collection::LocalChurches => "Local Church",
            Collection::Memberships => "Member",
            Collection::Ministries => "Ministry",
            Collection::Families => "Family",
            Collection::Councils => "Council",
            Collection::Attendances => "Attendance",
            Collection::Histories => "History",
            Collection::Users => "User",
            Collection::Logs => "Log",
        }
    }

    /// Composite keys enforced by the store's unique indexes
    pub fn unique_keys(&self) -> &'static [&'static [&'static str]] {
        match self {
            Collection::AnnualConferences => &[&["customId"], &["name", "episcopalArea"]],
            Collection::Districts => &[&["customId"], &["name", "annualConference"]],
            Collection::LocalChurches => &[&["customId"], &["name", "district"]],
            Collection::Memberships => &[&["customId"], &["name"]],
            Collection::Ministries => &[&["customId"], &["name", "localChurch"]],
            Collection::Families => &[&["customId"], &["familyName", "localChurch"]],
            Collection::Councils => &[&["customId"], &["startYear", "endYear", "localChurch"]],
            Collection::Attendances => &[&["customId"], &["localChurch", "date", "service"]],
            Collection::Histories => &[&["customId"]],
            Collection::Users => &[&["customId"], &["username"], &["email"]],
            Collection::Logs => &[],
        }
    }

    pub fn id_format(&self) -> Option<IdFormat> {
        let (counter_key, prefix, width) = match self {
            Collection::AnnualConferences => ("annualConference", "AC", 4),
            Collection::Districts => ("district", "DC", 4),
            Collection::LocalChurches => ("localChurch", "LC", 4),
            Collection::Memberships => ("membership", "UMC", 5),
            Collection::Ministries => ("ministry", "MLC", 4),
            Collection::Families => ("family", "FLC", 5),
            Collection::Councils => ("council", "CLC", 4),
            Collection::Attendances => ("attendance", "ATT", 5),
            Collection::Histories => ("history", "HLC", 4),
            Collection::Users => ("user", "USR", 4),
            Collection::Logs => return None,
        };
        Some(IdFormat { counter_key, prefix, width })
    }

    /// Field used as the display name when a reference is populated
    pub fn display_field(&self) -> &'static str {
        match self {
            Collection::Families => "familyName",
            Collection::Users => "username",
            Collection::Histories => "title",
            _ => "name",
        }
    }

    /// Reference to the owning parent in the hierarchy
    pub fn owner_field(&self) -> Option<&'static str> {
        match self {
            Collection::AnnualConferences | Collection::Users | Collection::Logs => None,
            Collection::Districts => Some("annualConference"),
            Collection::LocalChurches => Some("district"),
            Collection::Memberships
            | Collection::Ministries
            | Collection::Families
            | Collection::Councils
            | Collection::Attendances
            | Collection::Histories => Some("localChurch"),
        }
    }

    /// Collections whose mutations are written to the audit log
    pub fn is_audited(&self) -> bool {
        !matches!(self, Collection::Logs)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
