// src/handlers/rbac.rs
//
// Consulta do catálogo de permissões e cargos (tela de admin).

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermStaffRead, RequirePermission},
    rbac::catalog::PermissionKey,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleView {
    #[schema(example = "menu_editor")]
    pub slug: String,
    pub level: i32,
    pub superuser: bool,
    /// Chaves "recurso.ação" em ordem alfabética.
    #[schema(example = "[\"menu.read\", \"menu.update\"]")]
    pub permissions: Vec<String>,
}

// GET /api/rbac/permissions
#[utoipa::path(
    get,
    path = "/api/rbac/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Todas as chaves registradas", body = [String])
    ),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    _guard: RequirePermission<PermStaffRead>,
) -> Result<impl IntoResponse, AppError> {
    let keys: Vec<String> = PermissionKey::registry()
        .into_iter()
        .map(|k| k.to_string())
        .collect();

    Ok(Json(keys))
}

// GET /api/rbac/roles
#[utoipa::path(
    get,
    path = "/api/rbac/roles",
    tag = "RBAC",
    responses(
        (status = 200, description = "Cargos embutidos, do mais ao menos privilegiado", body = [RoleView])
    ),
    params(("x-tenant-id" = uuid::Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermStaffRead>,
) -> Result<impl IntoResponse, AppError> {
    let roles: Vec<RoleView> = app_state
        .catalog
        .roles()
        .into_iter()
        .map(|def| {
            let mut permissions: Vec<String> =
                def.permissions.iter().map(|k| k.to_string()).collect();
            permissions.sort();
            RoleView {
                slug: def.slug.clone(),
                level: def.level,
                superuser: def.superuser,
                permissions,
            }
        })
        .collect();

    Ok(Json(roles))
}
