// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::common::error::AppError;

// Cabeçalho que diz QUAL tenant o cliente quer acessar. A filiação do
// usuário a esse tenant é verificada depois, pelo guard.
const TENANT_ID_HEADER: &str = "x-tenant-id";

#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(TENANT_ID_HEADER)
            .ok_or_else(|| AppError::Validation("The x-tenant-id header is required".into()))?;

        let value_str = header_value
            .to_str()
            .map_err(|_| AppError::Validation("Invalid x-tenant-id header".into()))?;

        let tenant_id = Uuid::parse_str(value_str)
            .map_err(|_| AppError::Validation("x-tenant-id must be a UUID".into()))?;

        Ok(TenantContext(tenant_id))
    }
}
