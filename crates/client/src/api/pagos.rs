use kora_core::{AtencionId, VentaId};
use kora_sales::{PagoForm, PagoRegistrado};

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct PagosApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn pagos(&self) -> PagosApi<'_> {
        PagosApi { api: self }
    }
}

impl PagosApi<'_> {
    /// `POST /pagos-venta`; the answer carries the updated payment state.
    pub async fn pay_venta(&self, id_venta: VentaId, form: PagoForm) -> ApiResult<PagoRegistrado> {
        let payload = form.for_venta(id_venta)?;
        let paid: Option<PagoRegistrado> = self.api.post("/pagos-venta", &payload).await?;
        Ok(paid.unwrap_or_default())
    }

    pub async fn pay_atencion(
        &self,
        id_atencion: AtencionId,
        form: PagoForm,
    ) -> ApiResult<PagoRegistrado> {
        let payload = form.for_atencion(id_atencion)?;
        let paid: Option<PagoRegistrado> = self.api.post("/pagos-atencion", &payload).await?;
        Ok(paid.unwrap_or_default())
    }
}
