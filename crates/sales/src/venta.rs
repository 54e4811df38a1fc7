//! Product sales.

use chrono::{NaiveDate, NaiveDateTime};
use kora_core::lenient::{f64_or_zero, i64_or_zero, opt_f64};
use kora_core::validate::positive_int;
use kora_core::{ClientaId, DomainError, DomainResult, Entity, PersonalId, ProductoId, VentaId};
use serde::{Deserialize, Serialize};

use crate::atencion::parse_moment;

/// One line of a sale as returned in detail views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VentaItem {
    #[serde(default)]
    pub id_producto: Option<ProductoId>,
    #[serde(default)]
    pub producto_nombre: Option<String>,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub cantidad: i64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub precio_unitario: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VentaWire")]
pub struct Venta {
    pub id_venta: Option<VentaId>,
    pub id_clienta: Option<ClientaId>,
    pub id_personal: Option<PersonalId>,
    pub clienta_nombre: Option<String>,
    pub clienta_apellido: Option<String>,
    pub fecha: Option<String>,
    pub total: Option<f64>,
    pub estado_pago: Option<String>,
    pub items: Vec<VentaItem>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Sale as the backend sends it. The date may come as `fecha`, `fecha_venta`
/// or `created_at` and the total as `total` or `monto_total`; the first
/// present one wins.
#[derive(Deserialize)]
struct VentaWire {
    #[serde(default)]
    id_venta: Option<VentaId>,
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
    fecha: Option<String>,
    #[serde(default)]
    fecha_venta: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default, deserialize_with = "opt_f64")]
    total: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    monto_total: Option<f64>,
    #[serde(default)]
    estado_pago: Option<String>,
    #[serde(default)]
    items: Vec<VentaItem>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<VentaWire> for Venta {
    fn from(w: VentaWire) -> Self {
        Self {
            id_venta: w.id_venta,
            id_clienta: w.id_clienta,
            id_personal: w.id_personal,
            clienta_nombre: w.clienta_nombre.or(w.cliente_nombre),
            clienta_apellido: w.clienta_apellido.or(w.cliente_apellido),
            fecha: w.fecha.or(w.fecha_venta).or(w.created_at),
            total: w.total.or(w.monto_total),
            estado_pago: w.estado_pago,
            items: w.items,
            extra: w.extra,
        }
    }
}

impl Venta {
    pub fn clienta(&self) -> String {
        format!(
            "{} {}",
            self.clienta_nombre.as_deref().unwrap_or_default(),
            self.clienta_apellido.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    /// Backend total when present, otherwise the sum of the lines.
    pub fn total(&self) -> f64 {
        self.total.unwrap_or_else(|| {
            self.items
                .iter()
                .map(|i| i.cantidad as f64 * i.precio_unitario)
                .sum()
        })
    }

    pub fn is_paid(&self) -> bool {
        is_paid(self.estado_pago.as_deref())
    }

    pub fn sold_at(&self) -> Option<NaiveDateTime> {
        self.fecha.as_deref().and_then(parse_moment)
    }

    fn day(&self) -> Option<NaiveDate> {
        let raw = self.fecha.as_deref()?;
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }
}

impl Entity for Venta {
    type Id = VentaId;

    fn id(&self) -> Option<VentaId> {
        self.id_venta
    }
}

/// "pagado", "pagada" and other spellings starting with `pagad`.
pub fn is_paid(estado_pago: Option<&str>) -> bool {
    estado_pago
        .map(|s| s.trim().to_lowercase().starts_with("pagad"))
        .unwrap_or(false)
}

/// A line typed into the sale form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VentaItemInput {
    pub id_producto: ProductoId,
    pub cantidad: i64,
    pub precio_unitario: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VentaForm {
    pub id_clienta: ClientaId,
    pub id_personal: PersonalId,
    pub items: Vec<VentaItemInput>,
}

/// Body of `POST /ventas` and `PUT /ventas/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VentaPayload {
    pub id_clienta: ClientaId,
    pub id_personal: PersonalId,
    pub items: Vec<VentaItemInput>,
}

impl VentaPayload {
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.cantidad as f64 * i.precio_unitario)
            .sum()
    }
}

impl VentaForm {
    pub fn into_payload(self) -> DomainResult<VentaPayload> {
        if self.items.is_empty() {
            return Err(DomainError::validation("Debes agregar al menos 1 producto"));
        }
        for item in &self.items {
            positive_int("cantidad", item.cantidad)?;
            if !item.precio_unitario.is_finite() || item.precio_unitario < 0.0 {
                return Err(DomainError::validation("precio_unitario no puede ser negativo"));
            }
        }
        Ok(VentaPayload {
            id_clienta: self.id_clienta,
            id_personal: self.id_personal,
            items: self.items,
        })
    }
}

/// Low-stock notice returned after a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockWarning {
    #[serde(default)]
    pub producto_nombre: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub stock_actual: i64,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub stock_minimo: i64,
}

/// Answer of `POST /ventas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VentaCreated {
    #[serde(default)]
    pub id_venta: Option<VentaId>,
    #[serde(default)]
    pub warnings: Vec<StockWarning>,
}

/// Sale list filter: paid or unpaid, client name, inclusive day range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VentaFilter {
    pub only_paid: bool,
    pub clienta: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl VentaFilter {
    pub fn matches(&self, venta: &Venta) -> bool {
        if venta.is_paid() != self.only_paid {
            return false;
        }
        let term = self.clienta.trim().to_lowercase();
        if !term.is_empty() && !venta.clienta().to_lowercase().contains(&term) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(day) = venta.day() else {
                return false;
            };
            if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
                return false;
            }
        }
        true
    }

    /// Matching sales, oldest first. Undated ones sort first.
    pub fn apply<'a>(&self, ventas: &'a [Venta]) -> Vec<&'a Venta> {
        let mut found: Vec<&Venta> = ventas.iter().filter(|v| self.matches(v)).collect();
        found.sort_by_key(|v| v.sold_at());
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ventas() -> Vec<Venta> {
        serde_json::from_str(
            r#"[{"id_venta":1,"clienta_nombre":"Camila","clienta_apellido":"Soto","fecha":"2026-03-02T14:00:00.000Z","total":"20000.00","estado_pago":"Pagada"},
                {"id_venta":2,"clienta_nombre":"Daniela","fecha":"2026-03-05 10:00:00","monto_total":5000,"estado_pago":"pendiente"},
                {"id_venta":3,"clienta_nombre":"Camila","fecha":"2026-03-09","estado_pago":"parcial",
                 "items":[{"id_producto":1,"cantidad":2,"precio_unitario":"1500"}]}]"#,
        )
        .unwrap()
    }

    #[test]
    fn totals_fall_back_to_lines() {
        let list = ventas();
        assert_eq!(list[0].total(), 20000.0);
        assert_eq!(list[1].total(), 5000.0);
        assert_eq!(list[2].total(), 3000.0);
    }

    #[test]
    fn paid_filter_is_exclusive() {
        let list = ventas();
        let paid = VentaFilter { only_paid: true, ..VentaFilter::default() }.apply(&list);
        assert_eq!(paid.len(), 1);
        let unpaid = VentaFilter::default().apply(&list);
        assert_eq!(unpaid.len(), 2);
    }

    #[test]
    fn clienta_and_day_range() {
        let list = ventas();
        let filter = VentaFilter {
            clienta: "cami".into(),
            from: NaiveDate::from_ymd_opt(2026, 3, 3),
            to: NaiveDate::from_ymd_opt(2026, 3, 9),
            ..VentaFilter::default()
        };
        let found = filter.apply(&list);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), VentaId::new(3).ok());
    }

    #[test]
    fn sorted_oldest_first_using_date_fallbacks() {
        let list: Vec<Venta> = serde_json::from_str(
            r#"[{"id_venta":1,"fecha":"2026-03-09","estado_pago":"pendiente"},
                {"id_venta":2,"fecha":"2026-03-01 18:00:00","estado_pago":"pendiente"},
                {"id_venta":3,"fecha_venta":"2026-03-05 10:00:00","estado_pago":"pendiente"},
                {"id_venta":4,"created_at":"2026-03-01T09:00:00.000Z","estado_pago":"pendiente"}]"#,
        )
        .unwrap();
        let ids: Vec<i64> = VentaFilter::default()
            .apply(&list)
            .into_iter()
            .filter_map(|v| v.id())
            .map(i64::from)
            .collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn both_key_spellings_prefer_the_current_one() {
        let venta: Venta = serde_json::from_str(
            r#"{"id_venta":7,"total":"12000","monto_total":9000,
                "fecha":"2026-03-02 10:00:00","fecha_venta":"2026-01-01",
                "cliente_nombre":"Camila","cliente_apellido":"Soto"}"#,
        )
        .unwrap();
        assert_eq!(venta.total(), 12000.0);
        assert_eq!(venta.fecha.as_deref(), Some("2026-03-02 10:00:00"));
        assert_eq!(venta.clienta(), "Camila Soto");
    }

    #[test]
    fn form_needs_items() {
        let form = VentaForm {
            id_clienta: ClientaId::new(1).unwrap(),
            id_personal: PersonalId::new(2).unwrap(),
            items: vec![],
        };
        assert!(form.into_payload().is_err());
    }

    #[test]
    fn payload_total_is_a_sum() {
        let payload = VentaForm {
            id_clienta: ClientaId::new(1).unwrap(),
            id_personal: PersonalId::new(2).unwrap(),
            items: vec![
                VentaItemInput { id_producto: ProductoId::new(1).unwrap(), cantidad: 2, precio_unitario: 1000.0 },
                VentaItemInput { id_producto: ProductoId::new(2).unwrap(), cantidad: 1, precio_unitario: 500.0 },
            ],
        }
        .into_payload()
        .unwrap();
        assert_eq!(payload.total(), 2500.0);
    }
}
