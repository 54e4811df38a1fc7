//! `kora-core`: shared building blocks for the Köra Skin admin client.
//!
//! Pure types only: identifiers, the domain error model and the small set of
//! field checks every form performs before talking to the backend.

pub mod entity;
pub mod error;
pub mod id;
pub mod lenient;
pub mod validate;

pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use lenient::Flag;
pub use id::{
    AtencionId, ClientaId, PagoId, PersonalId, ProductoId, RolId, ServicioId, VentaId,
};
