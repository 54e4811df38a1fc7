//! The one owner of the session.
//!
//! State lives in a `watch` channel: screens subscribe and re-run the gate
//! when it changes instead of polling. Every mutation is written through to
//! durable storage before it is published.

use std::sync::{Arc, Mutex, PoisonError};

use kora_auth::{Session, UserProfile};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::auth::{self, LoginResponse};
use crate::error::ApiResult;
use crate::http::ApiClient;
use crate::storage::{MemoryStorage, SessionStorage, StorageError, TOKEN_KEY, USER_KEY};

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<Session>,
    // Serializes persist + publish so storage and memory never diverge.
    write: Mutex<()>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Hydrate from storage.
    ///
    /// An unreadable profile is treated as absent. A token without a profile
    /// (or the reverse) is discarded and both entries are removed.
    pub fn init(storage: Arc<dyn SessionStorage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty());
        let raw_user = storage.get(USER_KEY)?;
        let had_entries = token.is_some() || raw_user.is_some();
        let user = raw_user.and_then(|raw| match serde_json::from_str::<UserProfile>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "stored user profile is unreadable; ignoring it");
                None
            }
        });

        let session = Session::restore(token, user);
        if had_entries && !session.is_authenticated() {
            warn!("half-written session found in storage; clearing it");
            storage.remove(TOKEN_KEY)?;
            storage.remove(USER_KEY)?;
        }

        info!(authenticated = session.is_authenticated(), "session hydrated");
        let (state, _) = watch::channel(session);
        Ok(Self {
            storage,
            state,
            write: Mutex::new(()),
        })
    }

    /// A store backed by [`MemoryStorage`], starting anonymous.
    pub fn ephemeral() -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self {
            storage: Arc::new(MemoryStorage::new()),
            state,
            write: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn token(&self) -> String {
        self.state.borrow().token().to_string()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// `POST /auth/login`, then store token and profile.
    ///
    /// Returns the raw server payload so the caller can read the
    /// must-change-password flag. On error nothing is touched.
    pub async fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> ApiResult<LoginResponse> {
        let response = auth::request_login(api, email, password).await?;
        let session = response.session_for(email)?;
        self.commit(session)?;
        info!(
            email,
            must_change_password = response.must_change_password(),
            "logged in"
        );
        Ok(response)
    }

    /// Clear token and profile together.
    ///
    /// Memory is cleared even when storage fails; the storage error is still
    /// reported.
    pub fn logout(&self) -> Result<(), StorageError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let was_authenticated = self.is_authenticated();
        self.state.send_replace(Session::anonymous());
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        if was_authenticated {
            info!("logged out");
        }
        token.and(user)
    }

    /// Replace the profile of the current session.
    ///
    /// Returns `false` (and changes nothing) when nobody is logged in.
    pub fn set_user(&self, user: UserProfile) -> Result<bool, StorageError> {
        self.commit_with(|current| {
            if !current.is_authenticated() {
                warn!("set_user called without an authenticated session; ignoring");
                return None;
            }
            Some(current.with_user(user))
        })
    }

    /// Edit the current profile in place, e.g. to clear the
    /// must-change-password flag.
    ///
    /// `edit` runs while the store is locked and must not call back into it.
    pub fn update_user(&self, edit: impl FnOnce(&mut UserProfile)) -> Result<bool, StorageError> {
        self.commit_with(|current| {
            if !current.is_authenticated() {
                return None;
            }
            let mut user = current.user()?.clone();
            edit(&mut user);
            Some(current.with_user(user))
        })
    }

    fn commit(&self, next: Session) -> Result<(), StorageError> {
        self.commit_with(|_| Some(next)).map(|_| ())
    }

    /// Derive the next session from the current one and publish it, all under
    /// the write lock. `None` leaves everything untouched.
    fn commit_with(
        &self,
        derive: impl FnOnce(&Session) -> Option<Session>,
    ) -> Result<bool, StorageError> {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let Some(next) = derive(&current) else {
            return Ok(false);
        };
        self.persist(&next)?;
        self.state.send_replace(next);
        Ok(true)
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        if session.is_authenticated() {
            self.storage.set(TOKEN_KEY, session.token())?;
        } else {
            self.storage.remove(TOKEN_KEY)?;
        }
        match session.user() {
            Some(user) => {
                let raw = serde_json::to_string(user)?;
                self.storage.set(USER_KEY, &raw)
            }
            None => self.storage.remove(USER_KEY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_auth::{MustChangePassword, RoleRef};

    fn profile() -> UserProfile {
        serde_json::from_str(
            r#"{"email":"ana@kora.cl","nombre":"Ana","roles":[{"id_rol":1,"nombre":"Administradora"}],
                "must_change_password":1,"sucursal":"Providencia"}"#,
        )
        .unwrap()
    }

    fn seeded(storage: &Arc<MemoryStorage>) -> SessionStore {
        storage.set(TOKEN_KEY, "tok-1").unwrap();
        storage
            .set(USER_KEY, &serde_json::to_string(&profile()).unwrap())
            .unwrap();
        SessionStore::init(storage.clone()).unwrap()
    }

    #[test]
    fn hydrates_from_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = seeded(&storage);
        let session = store.snapshot();
        assert_eq!(session.token(), "tok-1");
        assert_eq!(session.user(), Some(&profile()));
        assert!(session.must_change_password());
    }

    #[test]
    fn corrupt_profile_is_ignored_and_cleared() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tok-1").unwrap();
        storage.set(USER_KEY, "{not json").unwrap();
        let store = SessionStore::init(storage.clone()).unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn logout_clears_memory_and_storage_together() {
        let storage = Arc::new(MemoryStorage::new());
        let store = seeded(&storage);
        let mut rx = store.subscribe();

        store.logout().unwrap();

        let session = store.snapshot();
        assert_eq!(session.token(), "");
        assert_eq!(session.user(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert!(rx.has_changed().unwrap());
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn update_user_writes_through() {
        let storage = Arc::new(MemoryStorage::new());
        let store = seeded(&storage);

        let changed = store
            .update_user(|u| u.must_change_password = MustChangePassword::CLEARED)
            .unwrap();
        assert!(changed);
        assert!(!store.snapshot().must_change_password());

        let stored: serde_json::Value =
            serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored["must_change_password"], 0);
        assert_eq!(stored["sucursal"], "Providencia");

        let reloaded = SessionStore::init(storage).unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn set_user_requires_a_session() {
        let store = SessionStore::ephemeral();
        let mut user = profile();
        user.roles = vec![RoleRef::plain("vendedora")];
        assert!(!store.set_user(user).unwrap());
        assert!(store.snapshot().user().is_none());
    }

    #[test]
    fn logout_during_profile_edit_is_not_undone() {
        let storage = Arc::new(MemoryStorage::new());
        let store = seeded(&storage);
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();

        std::thread::scope(|scope| {
            let editor = scope.spawn(|| {
                store.update_user(|u| {
                    entered_tx.send(()).unwrap();
                    std::thread::sleep(std::time::Duration::from_millis(50));
                    u.nombre = Some("Ana María".into());
                })
            });
            entered_rx.recv().unwrap();
            store.logout().unwrap();
            assert!(editor.join().unwrap().unwrap());
        });

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
