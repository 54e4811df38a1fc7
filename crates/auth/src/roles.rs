//! Role references as the backend sends them, and their normalized form.
//!
//! Depending on the endpoint a role arrives as a bare string
//! (`"administradora"`), as an object (`{"id_rol": 1, "nombre": "Administradora"}`)
//! or, for staff records, as a bare catalogue id (`1`). Everything is folded into
//! a [`RoleSet`] of lowercase names at the boundary; nothing downstream looks at
//! the original shape.

use std::collections::BTreeSet;

use kora_core::RolId;
use serde::{Deserialize, Serialize};

pub const ADMINISTRADORA: &str = "administradora";
pub const VENDEDORA: &str = "vendedora";
pub const MASOTERAPEUTA: &str = "masoterapeuta";

/// Normalized role name: trimmed and lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(String);

impl RoleName {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object-shaped role reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_rol: Option<RolId>,
    pub nombre: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A role as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    Named(NamedRole),
    Plain(String),
    Id(RolId),
}

impl RoleRef {
    pub fn plain(name: impl Into<String>) -> Self {
        Self::Plain(name.into())
    }

    pub fn named(id_rol: Option<RolId>, nombre: impl Into<String>) -> Self {
        Self::Named(NamedRole {
            id_rol,
            nombre: nombre.into(),
            extra: serde_json::Map::new(),
        })
    }

    /// The normalized name, when the reference carries one.
    pub fn name(&self) -> Option<RoleName> {
        match self {
            RoleRef::Named(role) => Some(RoleName::new(&role.nombre)),
            RoleRef::Plain(name) => Some(RoleName::new(name)),
            RoleRef::Id(_) => None,
        }
    }

    /// The catalogue id, when the reference carries one.
    pub fn id(&self) -> Option<RolId> {
        match self {
            RoleRef::Named(role) => role.id_rol,
            RoleRef::Plain(_) => None,
            RoleRef::Id(id) => Some(*id),
        }
    }
}

/// Canonical set of lowercase role names held by a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<RoleName>);

impl RoleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize wire references. Id-only references carry no name and are skipped.
    pub fn from_refs<'a>(refs: impl IntoIterator<Item = &'a RoleRef>) -> Self {
        Self(
            refs.into_iter()
                .filter_map(RoleRef::name)
                .filter(|n| !n.as_str().is_empty())
                .collect(),
        )
    }

    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(
            names
                .into_iter()
                .map(RoleName::new)
                .filter(|n| !n.as_str().is_empty())
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&RoleName::new(name))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoleName> {
        self.0.iter()
    }

    pub fn is_admin(&self) -> bool {
        self.contains(ADMINISTRADORA)
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(RoleName::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_shapes_normalize_to_the_same_name() {
        let refs: Vec<RoleRef> =
            serde_json::from_str(r#"["Administradora", {"id_rol": 2, "nombre": " VENDEDORA "}, 3]"#)
                .unwrap();

        assert!(matches!(refs[0], RoleRef::Plain(_)));
        assert!(matches!(refs[1], RoleRef::Named(_)));
        assert!(matches!(refs[2], RoleRef::Id(_)));

        let set = RoleSet::from_refs(&refs);
        assert_eq!(set.len(), 2);
        assert!(set.contains("administradora"));
        assert!(set.contains("Vendedora"));
        assert_eq!(set.to_string(), "administradora, vendedora");
    }

    #[test]
    fn named_role_keeps_unknown_fields() {
        let raw = r#"{"nombre":"masoterapeuta","descripcion":"masajes"}"#;
        let role: RoleRef = serde_json::from_str(raw).unwrap();
        let back = serde_json::to_value(&role).unwrap();
        assert_eq!(back["descripcion"], "masajes");
        assert!(back.get("id_rol").is_none());
    }

    #[test]
    fn blank_names_are_dropped() {
        let set = RoleSet::from_names(["", "  "]);
        assert!(set.is_empty());
    }
}
