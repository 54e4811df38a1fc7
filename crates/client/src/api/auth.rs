//! `/auth` endpoints: login and password change.

use kora_auth::{MustChangePassword, Session, UserProfile};
use kora_core::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_CHANGE_MESSAGE: &str = "Contraseña actualizada";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Answer of `POST /auth/login`, kept whole for the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    /// Some backends put the flag next to the token instead of on the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<MustChangePassword>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl LoginResponse {
    pub fn must_change_password(&self) -> bool {
        self.must_change_password
            .is_some_and(|flag| flag.is_required())
            || self
                .user
                .as_ref()
                .is_some_and(UserProfile::must_change_password)
    }

    /// The session this answer establishes.
    ///
    /// A missing profile becomes a bare one carrying the login email. A
    /// top-level flag is copied onto the profile so it survives a reload.
    pub fn session_for(&self, email: &str) -> ApiResult<Session> {
        let token = self
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Decode("login response carries no token".to_string()))?;

        let mut user = self.user.clone().unwrap_or_else(|| UserProfile {
            email: email.trim().to_string(),
            ..UserProfile::default()
        });
        if self.must_change_password() {
            user.must_change_password = MustChangePassword::REQUIRED;
        }
        Ok(Session::authenticated(token, user))
    }
}

pub(crate) async fn request_login(
    api: &ApiClient,
    email: &str,
    password: &str,
) -> ApiResult<LoginResponse> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(DomainError::validation("Debes ingresar email y contraseña").into());
    }
    api.post_anonymous("/auth/login", &LoginRequest { email, password })
        .await
}

/// Raw input of the change-password screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirmation: String,
}

/// Body of `POST /auth/change-password`; the backend expects camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordForm {
    pub fn into_payload(self) -> DomainResult<ChangePasswordPayload> {
        if self.current_password.is_empty()
            || self.new_password.is_empty()
            || self.confirmation.is_empty()
        {
            return Err(DomainError::validation("Debes completar todos los campos"));
        }
        if self.new_password != self.confirmation {
            return Err(DomainError::validation("Las contraseñas nuevas no coinciden"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "La nueva contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"
            )));
        }
        Ok(ChangePasswordPayload {
            current_password: self.current_password,
            new_password: self.new_password,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChangePasswordResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

impl ApiClient {
    /// Change the password and clear the must-change flag.
    ///
    /// Returns the confirmation message to show.
    pub async fn change_password(&self, form: ChangePasswordForm) -> ApiResult<String> {
        let payload = form.into_payload()?;
        let response: Option<ChangePasswordResponse> =
            self.post("/auth/change-password", &payload).await?;
        let response = response.unwrap_or_default();

        let session = self.session();
        match response.user {
            Some(user) => {
                session.set_user(user)?;
            }
            None => {
                session.update_user(|u| u.must_change_password = MustChangePassword::CLEARED)?;
            }
        }
        info!("password changed");

        Ok(response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANGE_MESSAGE.to_string()))
    }
}
