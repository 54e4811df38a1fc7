//! Services offered in appointments.

use kora_core::lenient::{f64_or_zero, i64_or_zero};
use kora_core::validate::{non_negative_amount, positive_int, required_text};
use kora_core::{DomainResult, Entity, Flag, ServicioId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Servicio {
    #[serde(default)]
    pub id_servicio: Option<ServicioId>,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub duracion_min: i64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub precio_base: f64,
    #[serde(default)]
    pub activo: Flag,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entity for Servicio {
    type Id = ServicioId;

    fn id(&self) -> Option<ServicioId> {
        self.id_servicio
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicioForm {
    pub nombre: String,
    pub duracion_min: i64,
    pub precio_base: f64,
}

/// Body of `POST /servicios` and `PUT /servicios/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicioPayload {
    pub nombre: String,
    pub duracion_min: i64,
    pub precio_base: f64,
}

impl ServicioForm {
    pub fn into_payload(self) -> DomainResult<ServicioPayload> {
        Ok(ServicioPayload {
            nombre: required_text("nombre", &self.nombre)?,
            duracion_min: positive_int("duracion_min", self.duracion_min)?,
            precio_base: non_negative_amount("precio_base", self.precio_base)?,
        })
    }
}

pub fn filter_servicios(items: &[Servicio], show_inactive: bool) -> Vec<&Servicio> {
    items
        .iter()
        .filter(|s| s.activo.is_set() != show_inactive)
        .collect()
}
