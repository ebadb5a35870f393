// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::CurrentUser,
    models::auth::{AuthResponse, LoginPayload},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    /// Conjunto efetivo da requisição (override aplicado, se houver).
    pub permissions: Vec<String>,
    pub location_ids: Vec<Uuid>,
}

// GET /api/me
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Dados do usuário autenticado", body = MeResponse)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(CurrentUser(principal): CurrentUser) -> Result<impl IntoResponse, AppError> {
    let mut permissions: Vec<String> = principal
        .effective_permissions
        .iter()
        .map(|k| k.to_string())
        .collect();
    permissions.sort();

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            id: principal.id,
            email: principal.email,
            role: principal.role,
            permissions,
            location_ids: principal.location_ids,
        }),
    ))
}
