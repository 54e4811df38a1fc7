//! Profile of the logged-in staff member, as returned by `/auth/login`.

use kora_core::{Flag, PersonalId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::roles::{RoleRef, RoleSet};

/// The "must change password" flag.
///
/// Decoded with the same tolerance as every other `0`/`1` column and always
/// written back as `0`/`1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MustChangePassword(Flag);

impl MustChangePassword {
    pub const REQUIRED: Self = Self(Flag::ON);
    pub const CLEARED: Self = Self(Flag::OFF);

    pub fn is_required(&self) -> bool {
        self.0.is_set()
    }
}

impl From<bool> for MustChangePassword {
    fn from(value: bool) -> Self {
        Self(Flag::from(value))
    }
}

/// User profile stored alongside the token.
///
/// Fields the client does not know about are kept in `extra` so the stored
/// profile survives a save/load cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub apellido: Option<String>,
    #[serde(default)]
    pub id_personal: Option<PersonalId>,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(default)]
    pub must_change_password: MustChangePassword,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl UserProfile {
    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_refs(&self.roles)
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password.is_required()
    }

    /// "Nombre Apellido", falling back to the email.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.nombre.as_deref(), self.apellido.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_accepts_every_backend_shape() {
        for (raw, expected) in [
            ("1", true),
            ("0", false),
            ("true", true),
            ("false", false),
            (r#""1""#, true),
            (r#""0""#, false),
            ("null", false),
        ] {
            let flag: MustChangePassword = serde_json::from_str(raw).unwrap();
            assert_eq!(flag.is_required(), expected, "input {raw}");
        }
        assert!(serde_json::from_str::<MustChangePassword>("[1]").is_err());
    }

    #[test]
    fn flag_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&MustChangePassword::REQUIRED).unwrap(), "1");
        assert_eq!(serde_json::to_string(&MustChangePassword::CLEARED).unwrap(), "0");
    }

    #[test]
    fn missing_fields_default() {
        let user: UserProfile = serde_json::from_str(r#"{"email":"ana@kora.cl"}"#).unwrap();
        assert!(!user.must_change_password());
        assert!(user.roles.is_empty());
        assert_eq!(user.display_name(), "ana@kora.cl");
    }

    #[test]
    fn profile_round_trips_through_json() {
        let raw = r#"{
            "email": "ana@kora.cl",
            "nombre": "Ana",
            "apellido": "Rojas",
            "id_personal": 4,
            "roles": ["administradora", {"id_rol": 3, "nombre": "vendedora"}],
            "must_change_password": 1,
            "telefono": "+56 9 1234 5678"
        }"#;
        let user: UserProfile = serde_json::from_str(raw).unwrap();
        assert_eq!(user.display_name(), "Ana Rojas");
        assert!(user.must_change_password());
        assert_eq!(user.extra["telefono"], "+56 9 1234 5678");

        let stored = serde_json::to_string(&user).unwrap();
        let reloaded: UserProfile = serde_json::from_str(&stored).unwrap();
        assert_eq!(reloaded, user);
    }
}
