//! Staff endpoints.
//!
//! An edit is two calls: base fields, then role assignments. When the second
//! one fails the first is reverted with the values loaded before the edit.

use kora_core::{PersonalId, RolId};
use kora_parties::{Personal, PersonalCreated, PersonalDetail, PersonalForm, Rol, resolve_role_ids};
use serde::de::IgnoredAny;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct PersonalApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn personal(&self) -> PersonalApi<'_> {
        PersonalApi { api: self }
    }
}

impl PersonalApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Personal>> {
        self.api.get("/personal").await
    }

    /// One staff member, whichever of the two detail shapes comes back.
    pub async fn get(&self, id: PersonalId) -> ApiResult<Personal> {
        let detail: PersonalDetail = self.api.get(&format!("/personal/{id}")).await?;
        Ok(detail.into_personal())
    }

    /// Load a staff member with her current roles resolved to catalogue ids,
    /// ready to prefill the edit form.
    pub async fn load_for_edit(&self, id: PersonalId) -> ApiResult<(Personal, Vec<RolId>, Vec<Rol>)> {
        let catalogue = self.api.roles().list().await?;
        let personal = self.get(id).await?;
        let ids = resolve_role_ids(&personal.roles, &catalogue);
        Ok((personal, ids, catalogue))
    }

    /// Create the account. The answer carries the temporary password.
    pub async fn create(&self, form: PersonalForm) -> ApiResult<PersonalCreated> {
        let payload = form.into_create()?;
        let created: PersonalCreated = self.api.post("/personal", &payload).await?;
        info!(id_personal = ?created.id_personal, "staff member created");
        Ok(created)
    }

    /// `PUT /personal/:id` then `PUT /personal/:id/roles`.
    ///
    /// `previous` is the record as loaded before editing; it is what gets
    /// written back if the roles call fails.
    pub async fn update(&self, id: PersonalId, form: PersonalForm, previous: &Personal) -> ApiResult<()> {
        let (datos, roles) = form.into_update()?;
        let path = format!("/personal/{id}");

        let _: IgnoredAny = self.api.put(&path, &datos).await?;

        let err = match self
            .api
            .put::<_, IgnoredAny>(&format!("{path}/roles"), &roles)
            .await
        {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        warn!(%id, error = %err, "role update failed after base fields were saved");
        // After a 401 the session is gone; reverting would be rejected too.
        let reverted = if err.is_unauthorized() {
            false
        } else {
            match self
                .api
                .put::<_, IgnoredAny>(&path, &previous.to_payload())
                .await
            {
                Ok(_) => {
                    info!(%id, "base fields reverted");
                    true
                }
                Err(revert_err) => {
                    warn!(%id, error = %revert_err, "could not revert base fields");
                    false
                }
            }
        };

        Err(ApiError::PartialUpdate {
            reverted,
            source: Box::new(err),
        })
    }

    pub async fn deactivate(&self, id: PersonalId) -> ApiResult<()> {
        let _: IgnoredAny = self.api.delete(&format!("/personal/{id}")).await?;
        Ok(())
    }

    pub async fn reactivate(&self, id: PersonalId) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .put_empty(&format!("/personal/{id}/activar"))
            .await?;
        Ok(())
    }
}
