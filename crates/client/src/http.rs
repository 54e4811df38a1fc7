//! The single HTTP client every resource call goes through.
//!
//! Attaches `Authorization: Bearer <token>` whenever the session has one,
//! maps non-2xx answers to [`ApiError`], and logs the session out when a
//! request that carried a token comes back 401.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session_store::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            session,
        })
    }

    /// Client with default transport settings, mostly for tests.
    pub fn with_base_url(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Log in through the session store.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> ApiResult<crate::api::auth::LoginResponse> {
        self.session.login(self, email, password).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::GET, path, None, true).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), true).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body), true).await
    }

    /// `PUT` without a body (`/activar` endpoints).
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::PUT, path, None, true).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, Some(body), true).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send::<(), T>(Method::DELETE, path, None, true).await
    }

    /// `POST` that never carries the session token (credentials exchange).
    pub(crate) async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body), false).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        with_token: bool,
    ) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = if with_token {
            self.session.token()
        } else {
            String::new()
        };

        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method.clone(), &url);
        if !token.is_empty() {
            req = req.bearer_auth(&token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(%method, path, authenticated = !token.is_empty(), "api request");
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if status.is_success() {
            return decode(&text);
        }

        let err = ApiError::from_status(status, &text);
        debug!(%method, path, status = status.as_u16(), error = %err, "api request failed");

        if err.is_unauthorized() && !token.is_empty() {
            warn!(path, "backend rejected the session token; logging out");
            if let Err(storage_err) = self.session.logout() {
                warn!(error = %storage_err, "could not clear stored session");
            }
        }

        Err(err)
    }
}

/// Empty 2xx bodies decode as JSON `null`, so `()` and `Option<T>` work.
fn decode<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let body = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_decodes_as_unit_or_none() {
        decode::<()>("").unwrap();
        assert_eq!(decode::<Option<u32>>("  ").unwrap(), None);
        assert_eq!(decode::<serde_json::Value>("").unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn shape_mismatch_is_a_decode_error() {
        let err = decode::<Vec<u32>>(r#"{"message":"ok"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let api = ApiClient::with_base_url("http://localhost:3000/", Arc::new(SessionStore::ephemeral()));
        assert_eq!(api.base_url(), "http://localhost:3000");
    }
}
