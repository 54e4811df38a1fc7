//! Sales (ventas), appointments (atenciones) and the payments against them.
//!
//! Totals here are display sums; the backend computes the authoritative
//! amounts and payment states.

pub mod atencion;
pub mod pago;
pub mod venta;

pub use atencion::{
    Atencion, AtencionCreated, AtencionFilter, AtencionForm, AtencionPayload, AtencionServicio,
    EstadoAtencion, EstadoAtencionPayload, ListMode, ServicioAplicado, to_backend_datetime,
};
pub use pago::{MedioPago, PagoAtencionPayload, PagoForm, PagoRegistrado, PagoVentaPayload};
pub use venta::{
    StockWarning, Venta, VentaCreated, VentaFilter, VentaForm, VentaItem, VentaItemInput,
    VentaPayload, is_paid,
};
