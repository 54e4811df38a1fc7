//! Staff records and the role catalogue.
//!
//! A staff member's roles come back in whichever shape the endpoint prefers
//! (objects, names or bare ids). Writes always send catalogue ids, so names
//! are resolved against `GET /roles` before an update.

use kora_auth::{RoleName, RoleRef, RoleSet};
use kora_core::validate::{optional_text, required_text};
use kora_core::{DomainError, DomainResult, Entity, Flag, PersonalId, RolId};
use serde::{Deserialize, Serialize};

/// Entry of the role catalogue (`GET /roles`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rol {
    pub id_rol: RolId,
    pub nombre: String,
}

/// A staff member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Personal {
    #[serde(default)]
    pub id_personal: Option<PersonalId>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub activo: Flag,
    #[serde(default)]
    pub roles: Vec<RoleRef>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Personal {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre.trim(), self.apellido.trim())
            .trim()
            .to_string()
    }

    pub fn role_set(&self) -> RoleSet {
        RoleSet::from_refs(&self.roles)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role_set().contains(role)
    }

    /// The base fields as they would be sent back with `PUT /personal/:id`.
    pub fn to_payload(&self) -> PersonalPayload {
        PersonalPayload {
            nombre: self.nombre.clone(),
            apellido: self.apellido.clone(),
            rut: self.rut.clone().unwrap_or_default(),
            direccion: self.direccion.clone(),
            telefono: self.telefono.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
        }
    }
}

impl Entity for Personal {
    type Id = PersonalId;

    fn id(&self) -> Option<PersonalId> {
        self.id_personal
    }
}

/// `GET /personal/:id` answers either with the record itself or with
/// `{ personal: {...}, roles: [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PersonalDetail {
    Wrapped {
        personal: Personal,
        #[serde(default)]
        roles: Vec<RoleRef>,
    },
    Flat(Personal),
}

impl PersonalDetail {
    pub fn into_personal(self) -> Personal {
        match self {
            PersonalDetail::Wrapped {
                mut personal,
                roles,
            } => {
                if personal.roles.is_empty() {
                    personal.roles = roles;
                }
                personal
            }
            PersonalDetail::Flat(personal) => personal,
        }
    }
}

/// Raw form input for staff create/edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalForm {
    pub nombre: String,
    pub apellido: String,
    pub rut: String,
    pub direccion: Option<String>,
    pub telefono: String,
    pub email: String,
    pub roles: Vec<RolId>,
}

/// Base fields (`PUT /personal/:id`); roles travel separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalPayload {
    pub nombre: String,
    pub apellido: String,
    pub rut: String,
    pub direccion: Option<String>,
    pub telefono: String,
    pub email: String,
}

/// Body of `POST /personal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalCreate {
    #[serde(flatten)]
    pub datos: PersonalPayload,
    pub roles: Vec<RolId>,
}

/// Body of `PUT /personal/:id/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolesPayload {
    pub roles: Vec<RolId>,
}

/// Answer of `POST /personal`: the new account starts with a temporary password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalCreated {
    #[serde(default)]
    pub id_personal: Option<PersonalId>,
    #[serde(default)]
    pub password_temporal: Option<String>,
    #[serde(default)]
    pub must_change_password: Flag,
}

impl PersonalForm {
    fn base(&self) -> DomainResult<PersonalPayload> {
        Ok(PersonalPayload {
            nombre: required_text("nombre", &self.nombre)?,
            apellido: required_text("apellido", &self.apellido)?,
            rut: required_text("rut", &self.rut)?,
            direccion: optional_text(self.direccion.as_deref()),
            telefono: required_text("telefono", &self.telefono)?,
            email: required_text("email", &self.email)?,
        })
    }

    fn roles(&self) -> DomainResult<Vec<RolId>> {
        if self.roles.is_empty() {
            return Err(DomainError::validation("Debes asignar al menos 1 rol"));
        }
        let mut ids = self.roles.clone();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    pub fn into_create(self) -> DomainResult<PersonalCreate> {
        Ok(PersonalCreate {
            datos: self.base()?,
            roles: self.roles()?,
        })
    }

    /// The two bodies an edit sends, in order.
    pub fn into_update(self) -> DomainResult<(PersonalPayload, RolesPayload)> {
        Ok((self.base()?, RolesPayload { roles: self.roles()? }))
    }
}

/// Map role references to catalogue ids.
///
/// References carrying an id use it; name-only references are looked up by
/// normalized name. Unknown names are dropped. Order of first appearance is kept.
pub fn resolve_role_ids(refs: &[RoleRef], catalogue: &[Rol]) -> Vec<RolId> {
    let mut ids: Vec<RolId> = Vec::new();
    for role in refs {
        let resolved = role.id().or_else(|| {
            let name = role.name()?;
            catalogue
                .iter()
                .find(|r| RoleName::new(&r.nombre) == name)
                .map(|r| r.id_rol)
        });
        if let Some(id) = resolved {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Staff holding `role` (e.g. every masoterapeuta for an appointment form).
pub fn with_role<'a>(list: &'a [Personal], role: &str) -> Vec<&'a Personal> {
    list.iter().filter(|p| p.has_role(role)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<Rol> {
        serde_json::from_str(
            r#"[{"id_rol":1,"nombre":"Administradora"},
                {"id_rol":2,"nombre":"Vendedora"},
                {"id_rol":3,"nombre":"Masoterapeuta"}]"#,
        )
        .unwrap()
    }

    #[test]
    fn wrapped_detail_takes_outer_roles() {
        let detail: PersonalDetail = serde_json::from_str(
            r#"{"personal":{"id_personal":9,"nombre":"Ana","apellido":"Rojas"},
                "roles":[{"id_rol":3,"nombre":"masoterapeuta"}]}"#,
        )
        .unwrap();
        let personal = detail.into_personal();
        assert_eq!(personal.id_personal, PersonalId::new(9).ok());
        assert!(personal.has_role("Masoterapeuta"));
    }

    #[test]
    fn flat_detail_is_accepted() {
        let detail: PersonalDetail =
            serde_json::from_str(r#"{"id_personal":9,"nombre":"Ana","roles":["vendedora"]}"#).unwrap();
        assert!(matches!(detail, PersonalDetail::Flat(_)));
        assert!(detail.into_personal().has_role("vendedora"));
    }

    #[test]
    fn resolves_every_role_shape() {
        let refs: Vec<RoleRef> =
            serde_json::from_str(r#"["VENDEDORA", {"id_rol":1,"nombre":"x"}, 3, "desconocida", 3]"#).unwrap();
        let ids: Vec<i64> = resolve_role_ids(&refs, &catalogue())
            .into_iter()
            .map(i64::from)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn form_requires_a_role() {
        let form = PersonalForm {
            nombre: "Ana".into(),
            apellido: "Rojas".into(),
            rut: "11.111.111-1".into(),
            telefono: "9".into(),
            email: "ana@kora.cl".into(),
            ..PersonalForm::default()
        };
        assert!(form.clone().into_create().is_err());

        let create = PersonalForm {
            roles: vec![RolId::new(3).unwrap(), RolId::new(3).unwrap()],
            ..form
        }
        .into_create()
        .unwrap();
        let json = serde_json::to_value(&create).unwrap();
        assert_eq!(json["roles"], serde_json::json!([3]));
        assert_eq!(json["email"], "ana@kora.cl");
        assert!(json["direccion"].is_null());
    }

    #[test]
    fn filters_by_role() {
        let list: Vec<Personal> = serde_json::from_str(
            r#"[{"nombre":"A","roles":[{"nombre":"Masoterapeuta"}]},
                {"nombre":"B","roles":["vendedora"]}]"#,
        )
        .unwrap();
        let masoterapeutas = with_role(&list, "masoterapeuta");
        assert_eq!(masoterapeutas.len(), 1);
        assert_eq!(masoterapeutas[0].nombre, "A");
    }
}
