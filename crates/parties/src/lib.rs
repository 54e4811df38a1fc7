//! People the business deals with: clients (clientas) and staff (personal).
//!
//! Records as the backend returns them, request payloads built from form
//! input, and the list filters the screens offer. No IO.

pub mod clienta;
pub mod personal;

pub use clienta::{ActivoPayload, Clienta, ClientaForm, ClientaPayload, filter_by_activo};
pub use personal::{
    Personal, PersonalCreate, PersonalCreated, PersonalDetail, PersonalForm, PersonalPayload, Rol,
    RolesPayload, resolve_role_ids, with_role,
};
