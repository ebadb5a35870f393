// src/handlers/staff.rs
//
// Endpoints de gestão de equipe. As regras de hierarquia (gerenciar e
// atribuir cargos estritamente abaixo) moram no StaffService; aqui só
// fica o contrato HTTP.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{
        PermStaffCreate, PermStaffDelete, PermStaffRead, PermStaffUpdate, RequirePermission,
    },
    models::auth::StaffUser,
    services::staff_service::NewStaff,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffPayload {
    #[validate(email(message = "invalid email"))]
    #[schema(example = "garcom@restaurante.com")]
    pub email: String,

    #[validate(length(min = 8, message = "at least 8 characters"))]
    pub password: String,

    #[schema(example = "foh_staff")]
    pub role: String,

    /// Override por usuário. Quando presente, SUBSTITUI os padrões do
    /// cargo; lista vazia revoga tudo.
    pub permissions: Option<Vec<String>>,

    #[serde(default)]
    pub location_ids: Vec<Uuid>,
}

// POST /api/staff
#[utoipa::path(
    post,
    path = "/api/staff",
    tag = "Staff",
    request_body = CreateStaffPayload,
    responses(
        (status = 201, description = "Usuário criado", body = StaffUser),
        (status = 403, description = "Cargo não atribuível por este usuário")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermStaffCreate>,
    Json(payload): Json<CreateStaffPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .staff_service
        .create(
            &guard.principal,
            NewStaff {
                email: payload.email,
                password: payload.password,
                role: payload.role,
                permissions: payload.permissions,
                location_ids: payload.location_ids,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/staff
#[utoipa::path(
    get,
    path = "/api/staff",
    tag = "Staff",
    responses((status = 200, description = "Equipe do tenant", body = [StaffUser])),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermStaffRead>,
) -> Result<impl IntoResponse, AppError> {
    let staff = app_state.staff_service.list(&guard.principal).await?;
    Ok(Json(staff))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccessPayload {
    #[schema(example = "menu_editor")]
    pub role: String,
    /// `null` limpa o override (volta aos padrões do cargo).
    pub permissions: Option<Vec<String>>,
}

// PUT /api/staff/{user_id}/access
#[utoipa::path(
    put,
    path = "/api/staff/{user_id}/access",
    tag = "Staff",
    request_body = UpdateAccessPayload,
    responses(
        (status = 200, description = "Acesso atualizado; vale já na próxima requisição", body = StaffUser),
        (status = 403, description = "Alvo ou novo cargo fora do alcance hierárquico")
    ),
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário alvo"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_staff_access(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermStaffUpdate>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateAccessPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .staff_service
        .update_access(&guard.principal, user_id, &payload.role, payload.permissions)
        .await?;

    Ok(Json(user))
}

// DELETE /api/staff/{user_id}
#[utoipa::path(
    delete,
    path = "/api/staff/{user_id}",
    tag = "Staff",
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 403, description = "Alvo fora do alcance hierárquico")
    ),
    params(
        ("user_id" = Uuid, Path, description = "ID do usuário alvo"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_staff(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermStaffDelete>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .staff_service
        .remove(&guard.principal, user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
