use kora_core::ServicioId;
use kora_products::{Servicio, ServicioForm};
use serde::de::IgnoredAny;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct ServiciosApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn servicios(&self) -> ServiciosApi<'_> {
        ServiciosApi { api: self }
    }
}

impl ServiciosApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Servicio>> {
        self.api.get("/servicios").await
    }

    pub async fn get(&self, id: ServicioId) -> ApiResult<Servicio> {
        self.api.get(&format!("/servicios/{id}")).await
    }

    pub async fn create(&self, form: ServicioForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.post("/servicios", &payload).await?;
        Ok(())
    }

    pub async fn update(&self, id: ServicioId, form: ServicioForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.put(&format!("/servicios/{id}"), &payload).await?;
        Ok(())
    }

    pub async fn deactivate(&self, id: ServicioId) -> ApiResult<()> {
        let _: IgnoredAny = self.api.delete(&format!("/servicios/{id}")).await?;
        Ok(())
    }

    pub async fn reactivate(&self, id: ServicioId) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .put_empty(&format!("/servicios/{id}/activar"))
            .await?;
        Ok(())
    }
}
