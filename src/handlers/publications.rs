// src/handlers/publications.rs
//
// Ativação de cardápios por localidade. Vários cardápios podem estar
// "no ar" na mesma localidade ao mesmo tempo; desativar é sempre uma
// ação explícita.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermMenuPublish, PermMenuRead, RequirePermission},
    models::publication::{ActivationOutcome, MenuPublication},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivatePayload {
    pub menu_id: Uuid,
}

// POST /api/locations/{location_id}/publications
#[utoipa::path(
    post,
    path = "/api/locations/{location_id}/publications",
    tag = "Publications",
    request_body = ActivatePayload,
    responses(
        (status = 200, description = "Publicação ativa (idempotente por par localidade+cardápio)", body = MenuPublication),
        (status = 400, description = "Cardápio não está publicado")
    ),
    params(
        ("location_id" = Uuid, Path, description = "ID da localidade"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuPublish>,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<ActivatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let publication = app_state
        .publication_service
        .activate(guard.principal.tenant_id, location_id, payload.menu_id)
        .await?;

    Ok(Json(publication))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateManyPayload {
    pub menu_ids: Vec<Uuid>,
}

// POST /api/locations/{location_id}/publications/batch
#[utoipa::path(
    post,
    path = "/api/locations/{location_id}/publications/batch",
    tag = "Publications",
    request_body = ActivateManyPayload,
    responses(
        (status = 200, description = "Resultado por cardápio; falhas parciais não abortam o lote", body = [ActivationOutcome])
    ),
    params(
        ("location_id" = Uuid, Path, description = "ID da localidade"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn activate_many(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuPublish>,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<ActivateManyPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outcomes = app_state
        .publication_service
        .activate_many(guard.principal.tenant_id, location_id, &payload.menu_ids)
        .await;

    Ok(Json(outcomes))
}

// DELETE /api/publications/{publication_id}
#[utoipa::path(
    delete,
    path = "/api/publications/{publication_id}",
    tag = "Publications",
    responses(
        (status = 204, description = "Publicação desativada"),
        (status = 404, description = "Publicação não encontrada no tenant")
    ),
    params(
        ("publication_id" = Uuid, Path, description = "ID da publicação"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuPublish>,
    Path(publication_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .publication_service
        .deactivate(guard.principal.tenant_id, publication_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/locations/{location_id}/publications
#[utoipa::path(
    get,
    path = "/api/locations/{location_id}/publications",
    tag = "Publications",
    responses(
        (status = 200, description = "Publicações atualmente ativas (cardápios arquivados não aparecem)", body = [MenuPublication])
    ),
    params(
        ("location_id" = Uuid, Path, description = "ID da localidade"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_current(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuRead>,
    Path(location_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let publications = app_state
        .publication_service
        .current_for_location(guard.principal.tenant_id, location_id)
        .await?;

    Ok(Json(publications))
}
