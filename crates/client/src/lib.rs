//! `kora-client`
//!
//! **Responsibility:** everything that talks to the outside world for the
//! Köra Skin admin client.
//!
//! This crate provides:
//! - configuration from the environment
//! - durable session storage and the session store that owns it
//! - the HTTP client (bearer injection, error mapping, logout on 401)
//! - typed calls per backend resource
//! - the navigator that runs the access gate and role filter on every route

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod navigator;
pub mod session_store;
pub mod storage;

pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use http::ApiClient;
pub use navigator::{Navigation, Navigator, Resource, Route, Screen};
pub use session_store::SessionStore;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
