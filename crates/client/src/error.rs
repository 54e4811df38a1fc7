//! Errors surfaced by the client.
//!
//! Every failure a screen can hit maps to one variant, and every variant can
//! produce the message shown inline next to the form or list that failed.

use kora_core::DomainError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::storage::StorageError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when an error body carries neither `message` nor `error`.
pub const FALLBACK_MESSAGE: &str = "No se pudo completar la solicitud";

#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP answer at all (connection refused, DNS, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// 401. When the request carried a token the session is already cleared.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other 4xx, usually a backend validation message.
    #[error("rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 2xx whose body does not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Form input failed local checks; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The second call of a two-call update failed after the first succeeded.
    /// `reverted` tells whether the first call was undone.
    #[error("second step of the update failed (first step reverted: {reverted}): {source}")]
    PartialUpdate {
        reverted: bool,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Classify a non-2xx answer.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = message_from_body(body, FALLBACK_MESSAGE);
        match status.as_u16() {
            401 => ApiError::Unauthorized { message },
            404 => ApiError::NotFound { message },
            code @ 500..=599 => ApiError::Server {
                status: code,
                message,
            },
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Rejected { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::PartialUpdate { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Human-readable text for inline display.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => "No se pudo conectar con el servidor".to_string(),
            ApiError::Unauthorized { message }
            | ApiError::NotFound { message }
            | ApiError::Rejected { message, .. }
            | ApiError::Server { message, .. } => message.clone(),
            ApiError::Decode(_) => "Respuesta inesperada del servidor".to_string(),
            ApiError::Invalid(err) => err.to_string(),
            ApiError::Storage(err) => err.to_string(),
            ApiError::PartialUpdate { reverted, source } => {
                if *reverted {
                    format!("{} (no se guardó ningún cambio)", source.user_message())
                } else {
                    format!(
                        "{} (los datos generales sí quedaron guardados)",
                        source.user_message()
                    )
                }
            }
        }
    }
}

/// Pull the human-readable message out of an error body: `message`, then
/// `error`, then `fallback`.
pub fn message_from_body(body: &str, fallback: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "error"].iter().find_map(|key| {
                v.get(key)
                    .and_then(serde_json::Value::as_str)
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
            })
        })
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_prefers_message_then_error() {
        assert_eq!(message_from_body(r#"{"message":"RUT duplicado"}"#, "x"), "RUT duplicado");
        assert_eq!(message_from_body(r#"{"error":"Token inválido"}"#, "x"), "Token inválido");
        assert_eq!(message_from_body(r#"{"message":"  ","error":"e"}"#, "x"), "e");
        assert_eq!(message_from_body("<html>oops</html>", "fallback"), "fallback");
        assert_eq!(message_from_body("", "fallback"), "fallback");
    }

    #[test]
    fn status_classification() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), FALLBACK_MESSAGE);

        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"No existe"}"#);
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "No existe"));

        let err = ApiError::from_status(StatusCode::CONFLICT, r#"{"message":"Choque de agenda"}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Choque de agenda");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "");
        assert!(matches!(err, ApiError::Server { status: 502, .. }));
    }

    #[test]
    fn partial_update_message_says_whether_it_was_reverted() {
        let failure = || {
            Box::new(ApiError::Rejected {
                status: 400,
                message: "Rol inválido".into(),
            })
        };
        let reverted = ApiError::PartialUpdate {
            reverted: true,
            source: failure(),
        };
        assert_eq!(reverted.status(), Some(400));
        assert_eq!(reverted.user_message(), "Rol inválido (no se guardó ningún cambio)");

        let kept = ApiError::PartialUpdate {
            reverted: false,
            source: failure(),
        };
        assert!(kept.user_message().ends_with("sí quedaron guardados)"));
    }
}
