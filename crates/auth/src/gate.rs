//! Access gate evaluated before any protected screen is shown.
//!
//! The decision is a pure function of three inputs: whether a token is
//! present, whether the profile carries the must-change-password flag, and the
//! requested path. Checks run in a fixed order and are re-run on every
//! navigation; nothing remembers that a previous navigation passed.

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const CHANGE_PASSWORD_PATH: &str = "/cambiar-clave";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Outcome of the gate for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested screen.
    Render,
    /// Not logged in. `from` is the location that was requested, so the login
    /// screen can send the user back there afterwards.
    RedirectToLogin { from: String },
    /// Logged in, but the password must be changed before anything else.
    RedirectToChangePassword,
}

impl GuardDecision {
    /// Where the navigation ends up, given the requested location.
    pub fn target<'a>(&'a self, requested: &'a str) -> &'a str {
        match self {
            GuardDecision::Render => requested,
            GuardDecision::RedirectToLogin { .. } => LOGIN_PATH,
            GuardDecision::RedirectToChangePassword => CHANGE_PASSWORD_PATH,
        }
    }
}

/// Strip query string and fragment, and any trailing slash except on `/`.
pub fn normalize_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = &location[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Evaluate the gate.
///
/// 1. no token: go to login, remembering `location`;
/// 2. must change password and not already on the change screen: go there;
/// 3. otherwise render.
pub fn evaluate(is_authenticated: bool, must_change_password: bool, location: &str) -> GuardDecision {
    let decision = if !is_authenticated {
        GuardDecision::RedirectToLogin {
            from: location.to_string(),
        }
    } else if must_change_password && normalize_path(location) != CHANGE_PASSWORD_PATH {
        GuardDecision::RedirectToChangePassword
    } else {
        GuardDecision::Render
    };

    tracing::debug!(location, ?decision, "access gate evaluated");
    decision
}

pub fn evaluate_session(session: &Session, location: &str) -> GuardDecision {
    evaluate(
        session.is_authenticated(),
        session.must_change_password(),
        location,
    )
}
