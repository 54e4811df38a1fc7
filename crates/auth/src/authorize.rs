//! Role filter for role-restricted screens and actions.
//!
//! Unlike the access gate this never redirects: a denied region is replaced by
//! an inline "access denied" notice.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::roles::{ADMINISTRADORA, MASOTERAPEUTA, RoleName, RoleSet, VENDEDORA};

/// Roles allowed into a region. An empty list means unrestricted.
///
/// Entries are normalized exactly like the user's roles, so a call site
/// writing `"Administradora"` matches a user holding `"administradora"`.
/// A list whose entries are all blank stays restricted and admits nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    roles: BTreeSet<RoleName>,
    restricted: bool,
}

impl AllowList {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn of<S: AsRef<str>>(roles: impl IntoIterator<Item = S>) -> Self {
        let mut restricted = false;
        let roles = roles
            .into_iter()
            .inspect(|_| restricted = true)
            .map(RoleName::new)
            .filter(|n| !n.as_str().is_empty())
            .collect();
        Self { roles, restricted }
    }

    pub fn is_unrestricted(&self) -> bool {
        !self.restricted
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleName> {
        self.roles.iter()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("access denied: requires one of [{required}]")]
    Forbidden { required: String },
}

/// `true` when the list is empty or the user holds at least one listed role.
pub fn is_allowed(allow: &AllowList, roles: &RoleSet) -> bool {
    allow.is_unrestricted() || allow.iter().any(|r| roles.contains(r.as_str()))
}

/// Same check as [`is_allowed`], as a `Result`.
pub fn authorize(allow: &AllowList, roles: &RoleSet) -> Result<(), AuthzError> {
    if is_allowed(allow, roles) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            required: joined(allow),
        })
    }
}

fn joined(allow: &AllowList) -> String {
    allow.iter().map(RoleName::as_str).collect::<Vec<_>>().join(", ")
}

/// Why a role check came out the way it did (shown by the terminal client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub granted: bool,
    pub reason: String,
    pub user_roles: Vec<String>,
    pub allowed_roles: Vec<String>,
}

pub fn explain_access(allow: &AllowList, roles: &RoleSet) -> AccessExplanation {
    let user_roles: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
    let allowed_roles: Vec<String> = allow.iter().map(|r| r.as_str().to_string()).collect();

    let reason = if allow.is_unrestricted() {
        "no role restriction".to_string()
    } else if let Some(hit) = allow.iter().find(|r| roles.contains(r.as_str())) {
        format!("user holds role '{hit}'")
    } else if roles.is_empty() {
        format!("user has no roles; requires one of [{}]", joined(allow))
    } else {
        format!(
            "user roles [{}] do not include any of [{}]",
            roles,
            joined(allow)
        )
    };

    AccessExplanation {
        granted: is_allowed(allow, roles),
        reason,
        user_roles,
        allowed_roles,
    }
}

/// Role-restricted actions offered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Register a product sale.
    RegisterVenta,
    /// Register an appointment.
    RegisterAtencion,
    /// Pick which masoterapeuta an appointment is assigned to.
    AssignMasoterapeuta,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::RegisterVenta,
        Capability::RegisterAtencion,
        Capability::AssignMasoterapeuta,
    ];

    pub fn allow_list(&self) -> AllowList {
        match self {
            Capability::RegisterVenta => AllowList::of([VENDEDORA, ADMINISTRADORA]),
            Capability::RegisterAtencion => AllowList::of([MASOTERAPEUTA, ADMINISTRADORA]),
            Capability::AssignMasoterapeuta => AllowList::of([ADMINISTRADORA]),
        }
    }

    pub fn is_granted(&self, roles: &RoleSet) -> bool {
        is_allowed(&self.allow_list(), roles)
    }

    /// Every capability the role set grants.
    pub fn granted(roles: &RoleSet) -> Vec<Capability> {
        Self::ALL
            .into_iter()
            .filter(|c| c.is_granted(roles))
            .collect()
    }
}
