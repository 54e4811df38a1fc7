use kora_core::{ClientaId, Flag};
use kora_parties::{ActivoPayload, Clienta, ClientaForm};
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct ClientasApi<'a> {
    api: &'a ApiClient,
}

#[derive(Debug, Default, Deserialize)]
struct Created {
    #[serde(default)]
    id_clienta: Option<ClientaId>,
    #[serde(default)]
    id: Option<ClientaId>,
}

impl ApiClient {
    pub fn clientas(&self) -> ClientasApi<'_> {
        ClientasApi { api: self }
    }
}

impl ClientasApi<'_> {
    /// Every client, active or not; filtering happens locally.
    pub async fn list(&self) -> ApiResult<Vec<Clienta>> {
        self.api.get("/clientas").await
    }

    pub async fn get(&self, id: ClientaId) -> ApiResult<Clienta> {
        self.api.get(&format!("/clientas/{id}")).await
    }

    pub async fn create(&self, form: ClientaForm) -> ApiResult<Option<ClientaId>> {
        let payload = form.into_payload()?;
        let created: Option<Created> = self.api.post("/clientas", &payload).await?;
        Ok(created.and_then(|c| c.id_clienta.or(c.id)))
    }

    pub async fn update(&self, id: ClientaId, form: ClientaForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.put(&format!("/clientas/{id}"), &payload).await?;
        Ok(())
    }

    pub async fn set_activo(&self, id: ClientaId, activo: bool) -> ApiResult<()> {
        let body = ActivoPayload {
            activo: Flag::from(activo),
        };
        let _: IgnoredAny = self
            .api
            .put(&format!("/clientas/{id}/activo"), &body)
            .await?;
        Ok(())
    }
}
