use kora_parties::Rol;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy)]
pub struct RolesApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    pub fn roles(&self) -> RolesApi<'_> {
        RolesApi { api: self }
    }
}

impl RolesApi<'_> {
    /// The role catalogue. An empty or missing body is an empty catalogue.
    pub async fn list(&self) -> ApiResult<Vec<Rol>> {
        let roles: Option<Vec<Rol>> = self.api.get("/roles").await?;
        Ok(roles.unwrap_or_default())
    }
}
