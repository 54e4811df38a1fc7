//! Appointments (atenciones): one client, one masoterapeuta, one or more services.

use chrono::{NaiveDate, NaiveDateTime};
use kora_core::lenient::{f64_or_zero, i64_or_zero, opt_f64};
use kora_core::validate::non_negative_int;
use kora_core::{
    AtencionId, ClientaId, DomainError, DomainResult, Entity, PersonalId, ServicioId,
};
use serde::{Deserialize, Serialize};

const BACKEND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ACCEPTED_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
];

pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Like [`parse_datetime`], but a bare `YYYY-MM-DD` counts as midnight.
pub(crate) fn parse_moment(raw: &str) -> Option<NaiveDateTime> {
    parse_datetime(raw).or_else(|| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Convert a local `datetime-local` value (`2026-03-02T14:30`) to the format
/// the backend stores (`2026-03-02 14:30:00`).
pub fn to_backend_datetime(local: &str) -> DomainResult<String> {
    if local.trim().is_empty() {
        return Err(DomainError::validation("fecha_inicio es obligatorio"));
    }
    parse_datetime(local)
        .map(|dt| dt.format(BACKEND_FORMAT).to_string())
        .ok_or_else(|| DomainError::validation(format!("fecha_inicio inválida: {local}")))
}

/// A service line inside an appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtencionServicio {
    #[serde(default)]
    pub id_servicio: Option<ServicioId>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub precio_aplicado: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AtencionWire")]
pub struct Atencion {
    pub id_atencion: Option<AtencionId>,
    pub id_clienta: Option<ClientaId>,
    pub id_personal: Option<PersonalId>,
    pub clienta_nombre: Option<String>,
    pub clienta_apellido: Option<String>,
    pub fecha_inicio: Option<String>,
    pub traslado_min: i64,
    pub estado_atencion: Option<String>,
    pub estado_pago: Option<String>,
    pub total: Option<f64>,
    pub servicios: Vec<AtencionServicio>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Appointment as the backend sends it. Older endpoints use `cliente_*`,
/// `fecha` and `estado`; when both spellings arrive the `clienta_*`,
/// `fecha_inicio` and `estado_atencion` ones win.
#[derive(Deserialize)]
struct AtencionWire {
    #[serde(default)]
    id_atencion: Option<AtencionId>,
    #[serde(default)]
    id_clienta: Option<ClientaId>,
    #[serde(default)]
    id_personal: Option<PersonalId>,
    #[serde(default)]
    clienta_nombre: Option<String>,
    #[serde(default)]
    cliente_nombre: Option<String>,
    #[serde(default)]
    clienta_apellido: Option<String>,
    #[serde(default)]
    cliente_apellido: Option<String>,
    #[serde(default)]
    fecha_inicio: Option<String>,
    #[serde(default)]
    fecha: Option<String>,
    #[serde(default, deserialize_with = "i64_or_zero")]
    traslado_min: i64,
    #[serde(default)]
    estado_atencion: Option<String>,
    #[serde(default)]
    estado: Option<String>,
    #[serde(default)]
    estado_pago: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    total: Option<f64>,
    #[serde(default)]
    servicios: Vec<AtencionServicio>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<AtencionWire> for Atencion {
    fn from(w: AtencionWire) -> Self {
        Self {
            id_atencion: w.id_atencion,
            id_clienta: w.id_clienta,
            id_personal: w.id_personal,
            clienta_nombre: w.clienta_nombre.or(w.cliente_nombre),
            clienta_apellido: w.clienta_apellido.or(w.cliente_apellido),
            fecha_inicio: w.fecha_inicio.or(w.fecha),
            traslado_min: w.traslado_min,
            estado_atencion: w.estado_atencion.or(w.estado),
            estado_pago: w.estado_pago,
            total: w.total,
            servicios: w.servicios,
            extra: w.extra,
        }
    }
}

impl Atencion {
    pub fn clienta(&self) -> String {
        format!(
            "{} {}",
            self.clienta_nombre.as_deref().unwrap_or_default(),
            self.clienta_apellido.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    fn estado(&self) -> String {
        self.estado_atencion
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    fn pago(&self) -> String {
        self.estado_pago
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    /// Done and fully paid.
    pub fn is_closed(&self) -> bool {
        self.estado() == "realizada" && self.pago() == "pagado"
    }

    pub fn is_cancelled(&self) -> bool {
        self.estado() == "cancelada"
    }

    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        self.fecha_inicio.as_deref().and_then(parse_datetime)
    }

    fn day(&self) -> Option<NaiveDate> {
        let raw = self.fecha_inicio.as_deref()?;
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }

    /// Backend total when present, otherwise the sum of applied prices.
    pub fn total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.servicios.iter().map(|s| s.precio_aplicado).sum())
    }
}

impl Entity for Atencion {
    type Id = AtencionId;

    fn id(&self) -> Option<AtencionId> {
        self.id_atencion
    }
}

/// Which appointments a list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListMode {
    /// Everything still open: hides closed and cancelled ones.
    #[default]
    Open,
    OnlyClosed,
    OnlyCancelled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtencionFilter {
    pub mode: ListMode,
    pub day: Option<NaiveDate>,
    pub id_personal: Option<PersonalId>,
    /// Matched against client name and both states, case-insensitively.
    pub term: String,
}

impl AtencionFilter {
    pub fn matches(&self, a: &Atencion) -> bool {
        let mode_ok = match self.mode {
            ListMode::Open => !a.is_closed() && !a.is_cancelled(),
            ListMode::OnlyClosed => a.is_closed(),
            ListMode::OnlyCancelled => a.is_cancelled(),
        };
        if !mode_ok {
            return false;
        }
        if self.day.is_some() && a.day() != self.day {
            return false;
        }
        if self.id_personal.is_some() && a.id_personal != self.id_personal {
            return false;
        }
        let term = self.term.trim().to_lowercase();
        term.is_empty()
            || a.clienta().to_lowercase().contains(&term)
            || a.estado().contains(&term)
            || a.pago().contains(&term)
    }

    /// Matching appointments, earliest first. Undated ones sort first.
    pub fn apply<'a>(&self, list: &'a [Atencion]) -> Vec<&'a Atencion> {
        let mut found: Vec<&Atencion> = list.iter().filter(|a| self.matches(a)).collect();
        found.sort_by_key(|a| a.starts_at());
        found
    }
}

/// Service line typed into the appointment form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServicioAplicado {
    pub id_servicio: ServicioId,
    pub precio_aplicado: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtencionForm {
    pub id_clienta: ClientaId,
    pub id_personal: Option<PersonalId>,
    /// `datetime-local` style input.
    pub fecha_inicio: String,
    pub traslado_min: i64,
    pub servicios: Vec<ServicioAplicado>,
}

/// Body of `POST /atenciones` and `PUT /atenciones/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtencionPayload {
    pub id_clienta: ClientaId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_personal: Option<PersonalId>,
    pub fecha_inicio: String,
    pub traslado_min: i64,
    pub servicios: Vec<ServicioAplicado>,
}

impl AtencionPayload {
    pub fn total(&self) -> f64 {
        self.servicios.iter().map(|s| s.precio_aplicado).sum()
    }
}

impl AtencionForm {
    fn build(self, id_personal: Option<PersonalId>) -> DomainResult<AtencionPayload> {
        if self.servicios.is_empty() {
            return Err(DomainError::validation("Debes agregar al menos 1 servicio."));
        }
        if self
            .servicios
            .iter()
            .any(|s| !s.precio_aplicado.is_finite() || s.precio_aplicado < 0.0)
        {
            return Err(DomainError::validation("precio_aplicado no puede ser negativo"));
        }
        Ok(AtencionPayload {
            id_clienta: self.id_clienta,
            id_personal,
            fecha_inicio: to_backend_datetime(&self.fecha_inicio)?,
            traslado_min: non_negative_int("traslado_min", self.traslado_min)?,
            servicios: self.servicios,
        })
    }

    /// New appointment: the masoterapeuta is mandatory.
    pub fn into_create(self) -> DomainResult<AtencionPayload> {
        let id_personal = self
            .id_personal
            .ok_or_else(|| DomainError::validation("id_personal es obligatorio"))?;
        self.build(Some(id_personal))
    }

    /// Edit: only an administradora may (and must) pick the masoterapeuta;
    /// for anyone else the field is left out of the body.
    pub fn into_update(self, editor_is_admin: bool) -> DomainResult<AtencionPayload> {
        if !editor_is_admin {
            return self.build(None);
        }
        let id_personal = self.id_personal.ok_or_else(|| {
            DomainError::validation(
                "Campos obligatorios: id_personal (cuando el rol es administradora)",
            )
        })?;
        self.build(Some(id_personal))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtencionCreated {
    #[serde(default)]
    pub id_atencion: Option<AtencionId>,
}

/// Target states of `PATCH /atenciones/:id/estado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstadoAtencion {
    Realizada,
    Cancelada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstadoAtencionPayload {
    pub estado_atencion: EstadoAtencion,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agenda() -> Vec<Atencion> {
        serde_json::from_str(
            r#"[{"id_atencion":1,"id_personal":5,"cliente_nombre":"Camila","cliente_apellido":"Soto","fecha_inicio":"2026-03-03 16:00:00","estado_atencion":"agendada","estado_pago":"pendiente"},
                {"id_atencion":2,"id_personal":6,"clienta_nombre":"Daniela","fecha":"2026-03-02 10:00:00","estado":"Realizada","estado_pago":"Pagado"},
                {"id_atencion":3,"id_personal":5,"clienta_nombre":"Fernanda","fecha_inicio":"2026-03-01 09:30:00","estado_atencion":"cancelada"},
                {"id_atencion":4,"id_personal":6,"clienta_nombre":"Camila","fecha_inicio":"2026-03-02 11:00:00","estado_atencion":"realizada","estado_pago":"parcial"}]"#,
        )
        .unwrap()
    }

    fn ids(list: Vec<&Atencion>) -> Vec<i64> {
        list.into_iter()
            .filter_map(|a| a.id())
            .map(i64::from)
            .collect()
    }

    #[test]
    fn default_mode_hides_closed_and_cancelled_sorted_by_date() {
        let list = agenda();
        assert_eq!(ids(AtencionFilter::default().apply(&list)), vec![4, 1]);
    }

    #[test]
    fn exclusive_modes() {
        let list = agenda();
        let closed = AtencionFilter { mode: ListMode::OnlyClosed, ..AtencionFilter::default() };
        assert_eq!(ids(closed.apply(&list)), vec![2]);
        let cancelled = AtencionFilter { mode: ListMode::OnlyCancelled, ..AtencionFilter::default() };
        assert_eq!(ids(cancelled.apply(&list)), vec![3]);
    }

    #[test]
    fn term_day_and_staff_filters_combine() {
        let list = agenda();
        let filter = AtencionFilter {
            term: "PARCIAL".into(),
            ..AtencionFilter::default()
        };
        assert_eq!(ids(filter.apply(&list)), vec![4]);

        let filter = AtencionFilter {
            day: NaiveDate::from_ymd_opt(2026, 3, 3),
            id_personal: PersonalId::new(5).ok(),
            term: "cami".into(),
            ..AtencionFilter::default()
        };
        assert_eq!(ids(filter.apply(&list)), vec![1]);
    }

    #[test]
    fn both_key_spellings_prefer_the_current_one() {
        let list: Vec<Atencion> = serde_json::from_str(
            r#"[{"id_atencion":1,"fecha_inicio":"2026-03-03 16:00:00","fecha":"2026-03-03",
                 "estado_atencion":"realizada","estado":"agendada",
                 "clienta_nombre":"Camila","cliente_nombre":"Cami"},
                {"id_atencion":2,"fecha_inicio":null,"fecha":"2026-03-01 09:00:00","estado":"cancelada"}]"#,
        )
        .unwrap();
        assert_eq!(list[0].fecha_inicio.as_deref(), Some("2026-03-03 16:00:00"));
        assert_eq!(list[0].estado_atencion.as_deref(), Some("realizada"));
        assert_eq!(list[0].clienta(), "Camila");
        assert!(!list[0].extra.contains_key("fecha"));
        assert_eq!(list[1].fecha_inicio.as_deref(), Some("2026-03-01 09:00:00"));
        assert!(list[1].is_cancelled());
    }

    #[test]
    fn datetime_local_is_converted() {
        assert_eq!(to_backend_datetime("2026-03-02T14:30").unwrap(), "2026-03-02 14:30:00");
        assert_eq!(to_backend_datetime("2026-03-02 14:30:00").unwrap(), "2026-03-02 14:30:00");
        assert!(to_backend_datetime("").is_err());
        assert!(to_backend_datetime("mañana").is_err());
    }

    fn form() -> AtencionForm {
        AtencionForm {
            id_clienta: ClientaId::new(1).unwrap(),
            id_personal: PersonalId::new(5).ok(),
            fecha_inicio: "2026-03-02T14:30".into(),
            traslado_min: 15,
            servicios: vec![
                ServicioAplicado { id_servicio: ServicioId::new(1).unwrap(), precio_aplicado: 25000.0 },
                ServicioAplicado { id_servicio: ServicioId::new(2).unwrap(), precio_aplicado: 5000.0 },
            ],
        }
    }

    #[test]
    fn non_admin_update_omits_personal() {
        let payload = form().into_update(false).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("id_personal").is_none());
        assert_eq!(payload.total(), 30000.0);
    }

    #[test]
    fn admin_update_requires_personal() {
        let mut f = form();
        f.id_personal = None;
        assert!(f.clone().into_update(true).is_err());
        assert!(f.into_create().is_err());
        assert_eq!(
            form().into_update(true).unwrap().id_personal,
            PersonalId::new(5).ok()
        );
    }

    #[test]
    fn estado_serializes_lowercase() {
        let body = EstadoAtencionPayload { estado_atencion: EstadoAtencion::Realizada };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"estado_atencion":"realizada"}"#);
    }
}
