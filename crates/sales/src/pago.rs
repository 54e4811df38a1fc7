//! Payments against a sale or an appointment.
//!
//! The client only records a payment; the backend decides the resulting
//! payment state (`pendiente`, `parcial`, `pagado`) and reports it back.

use kora_core::lenient::opt_f64;
use kora_core::validate::positive_amount;
use kora_core::{AtencionId, DomainError, DomainResult, VentaId};
use serde::{Deserialize, Serialize};

/// Payment method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedioPago {
    #[default]
    Efectivo,
    Transferencia,
    Debito,
    Credito,
}

impl MedioPago {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedioPago::Efectivo => "efectivo",
            MedioPago::Transferencia => "transferencia",
            MedioPago::Debito => "debito",
            MedioPago::Credito => "credito",
        }
    }
}

impl core::str::FromStr for MedioPago {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "efectivo" => Ok(MedioPago::Efectivo),
            "transferencia" => Ok(MedioPago::Transferencia),
            "debito" | "débito" => Ok(MedioPago::Debito),
            "credito" | "crédito" => Ok(MedioPago::Credito),
            "" => Err(DomainError::validation("medio_pago es obligatorio.")),
            other => Err(DomainError::validation(format!("medio_pago desconocido: {other}"))),
        }
    }
}

impl core::fmt::Display for MedioPago {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount and method typed into either payment form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagoForm {
    pub monto: f64,
    pub medio_pago: MedioPago,
}

impl PagoForm {
    fn checked_monto(&self) -> DomainResult<f64> {
        positive_amount("monto", self.monto)
    }

    pub fn for_venta(self, id_venta: VentaId) -> DomainResult<PagoVentaPayload> {
        Ok(PagoVentaPayload {
            id_venta,
            monto: self.checked_monto()?,
            medio_pago: self.medio_pago,
        })
    }

    pub fn for_atencion(self, id_atencion: AtencionId) -> DomainResult<PagoAtencionPayload> {
        Ok(PagoAtencionPayload {
            id_atencion,
            monto: self.checked_monto()?,
            medio_pago: self.medio_pago,
        })
    }
}

/// Body of `POST /pagos-venta`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagoVentaPayload {
    pub id_venta: VentaId,
    pub monto: f64,
    pub medio_pago: MedioPago,
}

/// Body of `POST /pagos-atencion`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagoAtencionPayload {
    pub id_atencion: AtencionId,
    pub monto: f64,
    pub medio_pago: MedioPago,
}

/// Answer of both payment endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PagoRegistradoWire")]
pub struct PagoRegistrado {
    pub estado_pago: Option<String>,
    #[serde(rename = "totalPagado")]
    pub total_pagado: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `totalPagado` is the current key; `total_pagado` is the fallback.
#[derive(Deserialize)]
struct PagoRegistradoWire {
    #[serde(default)]
    estado_pago: Option<String>,
    #[serde(default, rename = "totalPagado", deserialize_with = "opt_f64")]
    total_pagado_camel: Option<f64>,
    #[serde(default, deserialize_with = "opt_f64")]
    total_pagado: Option<f64>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<PagoRegistradoWire> for PagoRegistrado {
    fn from(w: PagoRegistradoWire) -> Self {
        Self {
            estado_pago: w.estado_pago,
            total_pagado: w.total_pagado_camel.or(w.total_pagado),
            extra: w.extra,
        }
    }
}
