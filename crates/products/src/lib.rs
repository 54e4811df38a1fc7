//! Catalogue: retail products (productos) and bookable services (servicios).
//!
//! Prices and stock are owned by the backend; this crate only shapes requests
//! and filters what was already fetched.

pub mod producto;
pub mod servicio;

pub use producto::{Producto, ProductoForm, ProductoPayload, SumarStock, low_stock, search};
pub use servicio::{Servicio, ServicioForm, ServicioPayload, filter_servicios};
