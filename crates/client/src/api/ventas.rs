use kora_auth::Session;
use kora_auth::roles::VENDEDORA;
use kora_core::{DomainError, DomainResult, PersonalId, ProductoId, VentaId, find_by_id};
use kora_parties::Personal;
use kora_products::Producto;
use kora_sales::{Venta, VentaCreated, VentaForm, VentaItemInput};
use serde::de::IgnoredAny;
use tracing::warn;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct VentasApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn ventas(&self) -> VentasApi<'_> {
        VentasApi { api: self }
    }
}

impl VentasApi<'_> {
    pub async fn list(&self) -> ApiResult<Vec<Venta>> {
        self.api.get("/ventas").await
    }

    pub async fn get(&self, id: VentaId) -> ApiResult<Venta> {
        self.api.get(&format!("/ventas/{id}")).await
    }

    /// Register a sale. The answer may carry low-stock warnings.
    pub async fn create(&self, form: VentaForm) -> ApiResult<VentaCreated> {
        let payload = form.into_payload()?;
        let created: Option<VentaCreated> = self.api.post("/ventas", &payload).await?;
        let created = created.unwrap_or_default();
        for w in &created.warnings {
            warn!(
                producto = %w.producto_nombre,
                stock_actual = w.stock_actual,
                stock_minimo = w.stock_minimo,
                "product below minimum stock after sale"
            );
        }
        Ok(created)
    }

    pub async fn update(&self, id: VentaId, form: VentaForm) -> ApiResult<()> {
        let payload = form.into_payload()?;
        let _: IgnoredAny = self.api.put(&format!("/ventas/{id}"), &payload).await?;
        Ok(())
    }
}

/// A sale line priced from the catalogue, as when a product is picked in the form.
pub fn line_from_catalogue(
    catalogue: &[Producto],
    id_producto: ProductoId,
    cantidad: i64,
) -> DomainResult<VentaItemInput> {
    let producto = find_by_id(catalogue, id_producto).ok_or_else(|| {
        DomainError::validation(format!("El producto {id_producto} no existe"))
    })?;
    if !producto.is_active() {
        return Err(DomainError::validation(format!(
            "El producto {} está inactivo",
            producto.nombre
        )));
    }
    Ok(VentaItemInput {
        id_producto,
        cantidad,
        precio_unitario: producto.precio,
    })
}

/// The seller preselected in the form: the logged-in user, when she is an
/// active vendedora in the staff list.
pub fn default_seller(session: &Session, staff: &[Personal]) -> Option<PersonalId> {
    let id = session.user()?.id_personal?;
    find_by_id(staff, id)
        .filter(|p| p.activo.is_set() && p.has_role(VENDEDORA))
        .map(|_| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kora_auth::UserProfile;

    fn catalogue() -> Vec<Producto> {
        serde_json::from_str(
            r#"[{"id_producto":1,"nombre":"Sérum","precio":"12990","stock":4,"stock_minimo":2,"activo":1},
                {"id_producto":2,"nombre":"Tónico","precio":8990,"stock":0,"stock_minimo":1,"activo":0}]"#,
        )
        .unwrap()
    }

    #[test]
    fn line_takes_catalogue_price() {
        let line = line_from_catalogue(&catalogue(), ProductoId::new(1).unwrap(), 2).unwrap();
        assert_eq!(line.precio_unitario, 12990.0);
        assert_eq!(line.cantidad, 2);
    }

    #[test]
    fn unknown_or_inactive_products_are_refused() {
        let err = line_from_catalogue(&catalogue(), ProductoId::new(9).unwrap(), 1).unwrap_err();
        assert_eq!(err.to_string(), "El producto 9 no existe");
        let err = line_from_catalogue(&catalogue(), ProductoId::new(2).unwrap(), 1).unwrap_err();
        assert_eq!(err.to_string(), "El producto Tónico está inactivo");
    }

    #[test]
    fn seller_defaults_to_logged_in_vendedora() {
        let staff: Vec<Personal> = serde_json::from_str(
            r#"[{"id_personal":4,"nombre":"Valentina","activo":1,"roles":["Vendedora"]},
                {"id_personal":5,"nombre":"Marta","activo":1,"roles":["masoterapeuta"]}]"#,
        )
        .unwrap();
        let session_for = |id: i64| {
            Session::authenticated(
                "tok",
                UserProfile {
                    email: "x@kora.cl".into(),
                    id_personal: Some(PersonalId::new(id).unwrap()),
                    ..UserProfile::default()
                },
            )
        };
        assert_eq!(default_seller(&session_for(4), &staff), Some(PersonalId::new(4).unwrap()));
        assert_eq!(default_seller(&session_for(5), &staff), None);
        assert_eq!(default_seller(&Session::anonymous(), &staff), None);
    }
}
