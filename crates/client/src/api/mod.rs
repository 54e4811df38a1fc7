//! Typed calls for each backend resource.
//!
//! Each resource hangs off [`ApiClient`](crate::http::ApiClient) as a small
//! borrowed handle (`api.clientas().list()`). Form input is validated locally
//! first; nothing is sent when validation fails.

pub mod atenciones;
pub mod auth;
pub mod clientas;
pub mod pagos;
pub mod personal;
pub mod productos;
pub mod roles;
pub mod servicios;
pub mod ventas;

pub use atenciones::AtencionesApi;
pub use auth::{ChangePasswordForm, ChangePasswordPayload, LoginResponse};
pub use clientas::ClientasApi;
pub use pagos::PagosApi;
pub use personal::PersonalApi;
pub use productos::ProductosApi;
pub use roles::RolesApi;
pub use servicios::ServiciosApi;
pub use ventas::{VentasApi, default_seller, line_from_catalogue};
