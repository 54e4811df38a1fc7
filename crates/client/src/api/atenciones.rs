use kora_core::AtencionId;
use kora_sales::{Atencion, AtencionCreated, AtencionForm, EstadoAtencion, EstadoAtencionPayload};
use serde::de::IgnoredAny;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct AtencionesApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn atenciones(&self) -> AtencionesApi<'_> {
        AtencionesApi { api: self }
    }
}

impl AtencionesApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Atencion>> {
        self.api.get("/atenciones").await
    }

    pub async fn get(&self, id: AtencionId) -> ApiResult<Atencion> {
        self.api.get(&format!("/atenciones/{id}")).await
    }

    pub async fn create(&self, form: AtencionForm) -> ApiResult<AtencionCreated> {
        let payload = form.into_create()?;
        let created: Option<AtencionCreated> = self.api.post("/atenciones", &payload).await?;
        Ok(created.unwrap_or_default())
    }

    /// Only an administradora may reassign the masoterapeuta; for anyone
    /// else the field is left out of the body.
    pub async fn update(&self, id: AtencionId, form: AtencionForm) -> ApiResult<()> {
        let editor_is_admin = self.api.session().snapshot().roles().is_admin();
        let payload = form.into_update(editor_is_admin)?;
        let _: IgnoredAny = self.api.put(&format!("/atenciones/{id}"), &payload).await?;
        Ok(())
    }

    pub async fn set_estado(&self, id: AtencionId, estado: EstadoAtencion) -> ApiResult<()> {
        let body = EstadoAtencionPayload {
            estado_atencion: estado,
        };
        let _: IgnoredAny = self
            .api
            .patch(&format!("/atenciones/{id}/estado"), &body)
            .await?;
        Ok(())
    }
}
