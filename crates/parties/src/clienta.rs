//! Client records.

use kora_core::validate::{optional_text, required_text};
use kora_core::{ClientaId, DomainResult, Entity, Flag};
use serde::{Deserialize, Serialize};

/// A client as listed by `GET /clientas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clienta {
    #[serde(default)]
    pub id_clienta: Option<ClientaId>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub activo: Flag,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Clienta {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre.trim(), self.apellido.trim())
            .trim()
            .to_string()
    }

    pub fn is_active(&self) -> bool {
        self.activo.is_set()
    }
}

impl Entity for Clienta {
    type Id = ClientaId;

    fn id(&self) -> Option<ClientaId> {
        self.id_clienta
    }
}

/// Raw form input for creating or editing a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientaForm {
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

/// Body of `POST /clientas` and `PUT /clientas/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientaPayload {
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    pub email: Option<String>,
    pub direccion: Option<String>,
}

impl ClientaForm {
    pub fn into_payload(self) -> DomainResult<ClientaPayload> {
        Ok(ClientaPayload {
            nombre: required_text("nombre", &self.nombre)?,
            apellido: required_text("apellido", &self.apellido)?,
            telefono: required_text("telefono", &self.telefono)?,
            email: optional_text(self.email.as_deref()),
            direccion: optional_text(self.direccion.as_deref()),
        })
    }
}

/// Body of `PUT /clientas/:id/activo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivoPayload {
    pub activo: Flag,
}

/// Active clients, or only the inactive ones when `show_inactive` is set.
pub fn filter_by_activo(list: &[Clienta], show_inactive: bool) -> Vec<&Clienta> {
    list.iter()
        .filter(|c| c.is_active() != show_inactive)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_become_null() {
        let payload = ClientaForm {
            nombre: " Camila ".into(),
            apellido: "Soto".into(),
            telefono: "912345678".into(),
            email: Some("   ".into()),
            direccion: None,
        }
        .into_payload()
        .unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["nombre"], "Camila");
        assert!(json["email"].is_null());
        assert!(json["direccion"].is_null());
    }

    #[test]
    fn telefono_is_required() {
        let err = ClientaForm {
            nombre: "Camila".into(),
            apellido: "Soto".into(),
            ..ClientaForm::default()
        }
        .into_payload()
        .unwrap_err();
        assert!(err.to_string().contains("telefono"));
    }

    #[test]
    fn active_filter_splits_list() {
        let list: Vec<Clienta> = serde_json::from_str(
            r#"[{"id_clienta":1,"nombre":"A","apellido":"X","activo":1},
                {"id_clienta":2,"nombre":"B","apellido":"Y","activo":0}]"#,
        )
        .unwrap();
        let active = filter_by_activo(&list, false);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].full_name(), "A X");
        assert_eq!(filter_by_activo(&list, true)[0].id(), ClientaId::new(2).ok());
    }
}
