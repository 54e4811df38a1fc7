use kora_core::ProductoId;
use kora_products::{Producto, ProductoForm, SumarStock};
use serde::de::IgnoredAny;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct ProductosApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn productos(&self) -> ProductosApi<'_> {
        ProductosApi { api: self }
    }
}

impl ProductosApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Producto>> {
        self.api.get("/productos").await
    }

    pub async fn get(&self, id: ProductoId) -> ApiResult<Producto> {
        self.api.get(&format!("/productos/{id}")).await
    }

    pub async fn create(&self, form: ProductoForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.post("/productos", &payload).await?;
        Ok(())
    }

    pub async fn update(&self, id: ProductoId, form: ProductoForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.put(&format!("/productos/{id}"), &payload).await?;
        Ok(())
    }

    /// Soft delete: the product is kept but marked inactive.
    pub async fn deactivate(&self, id: ProductoId) -> ApiResult<()> {
        let _: IgnoredAny = self.api.delete(&format!("/productos/{id}")).await?;
        Ok(())
    }

    pub async fn reactivate(&self, id: ProductoId) -> ApiResult<()> {
        let _: IgnoredAny = self
            .api
            .put_empty(&format!("/productos/{id}/activar"))
            .await?;
        Ok(())
    }

    pub async fn add_stock(&self, id: ProductoId, cantidad: i64) -> ApiResult<()> {
        let body = SumarStock::new(cantidad)?;
        let _: IgnoredAny = self
            .api
            .put(&format!("/productos/{id}/sumar-stock"), &body)
            .await?;
        Ok(())
    }
}
