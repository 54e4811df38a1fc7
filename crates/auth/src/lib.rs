//! `kora-auth`: session model and the guard chain in front of every screen.
//!
//! This crate is intentionally decoupled from HTTP and storage: it only
//! branches on session state that somebody else already loaded.

pub mod authorize;
pub mod gate;
pub mod roles;
pub mod session;
pub mod user;

pub use authorize::{AccessExplanation, AllowList, AuthzError, Capability, authorize, explain_access, is_allowed};
pub use gate::{CHANGE_PASSWORD_PATH, DASHBOARD_PATH, GuardDecision, LOGIN_PATH, evaluate, evaluate_session, normalize_path};
pub use roles::{NamedRole, RoleName, RoleRef, RoleSet};
pub use session::Session;
pub use user::{MustChangePassword, UserProfile};
