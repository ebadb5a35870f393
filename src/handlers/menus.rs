// src/handlers/menus.rs

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{
            PermItemCreate, PermItemUpdate, PermMenuCreate, PermMenuDelete, PermMenuPublish,
            PermMenuRead, PermMenuUpdate, PermSectionCreate, PermissionDef, RequirePermission,
        },
        tenancy::TenantContext,
    },
    models::menu::{Item, LineType, Menu, MenuLine, MenuTree, Section},
    services::menu_service::{LineUpdate, NewLine},
};

// Distingue "campo ausente" de "campo null" no JSON do patch.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

// =============================================================================
//  CARDÁPIOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuPayload {
    pub brand_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "almoco-verao")]
    pub code: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Almoço de Verão")]
    pub name: String,
}

// POST /api/menus
#[utoipa::path(
    post,
    path = "/api/menus",
    tag = "Menus",
    request_body = CreateMenuPayload,
    responses(
        (status = 201, description = "Cardápio criado em rascunho", body = Menu)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_menu(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuCreate>,
    Json(payload): Json<CreateMenuPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let menu = app_state
        .menu_service
        .create_menu(
            guard.principal.tenant_id,
            payload.brand_id,
            &payload.code,
            &payload.name,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(menu)))
}

// GET /api/menus
#[utoipa::path(
    get,
    path = "/api/menus",
    tag = "Menus",
    responses((status = 200, description = "Cardápios do tenant", body = [Menu])),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn list_menus(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuRead>,
) -> Result<impl IntoResponse, AppError> {
    let menus = app_state
        .menu_service
        .list_menus(guard.principal.tenant_id)
        .await?;

    Ok(Json(menus))
}

// GET /api/menus/{menu_id}
#[utoipa::path(
    get,
    path = "/api/menus/{menu_id}",
    tag = "Menus",
    responses(
        (status = 200, description = "Cardápio", body = Menu),
        (status = 404, description = "Não encontrado (ou fora do tenant)")
    ),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_menu(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuRead>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state
        .menu_service
        .get_menu(guard.principal.tenant_id, menu_id)
        .await?;

    // Escopo de tenant reverificado no objeto carregado: mismatch
    // responde 404, indistinguível de inexistente.
    app_state
        .guard
        .check_resource_access(&guard.principal, &menu, PermMenuRead::key())?;

    Ok(Json(menu))
}

// POST /api/menus/{menu_id}/publish
#[utoipa::path(
    post,
    path = "/api/menus/{menu_id}/publish",
    tag = "Menus",
    responses(
        (status = 200, description = "Cardápio publicado", body = Menu),
        (status = 409, description = "Transição de status inválida")
    ),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn publish_menu(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuPublish>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state
        .menu_service
        .publish_menu(guard.principal.tenant_id, menu_id)
        .await?;
    Ok(Json(menu))
}

// POST /api/menus/{menu_id}/unpublish
#[utoipa::path(
    post,
    path = "/api/menus/{menu_id}/unpublish",
    tag = "Menus",
    responses((status = 200, description = "Cardápio de volta a rascunho", body = Menu)),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn unpublish_menu(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuPublish>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state
        .menu_service
        .unpublish_menu(guard.principal.tenant_id, menu_id)
        .await?;
    Ok(Json(menu))
}

// POST /api/menus/{menu_id}/archive
#[utoipa::path(
    post,
    path = "/api/menus/{menu_id}/archive",
    tag = "Menus",
    responses((status = 200, description = "Cardápio arquivado (terminal)", body = Menu)),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn archive_menu(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuDelete>,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let menu = app_state
        .menu_service
        .archive_menu(guard.principal.tenant_id, menu_id)
        .await?;
    Ok(Json(menu))
}

// GET /api/menus/{menu_id}/tree  (vitrine pública, sem autenticação)
#[utoipa::path(
    get,
    path = "/api/menus/{menu_id}/tree",
    tag = "Menus",
    responses(
        (status = 200, description = "Árvore publicada, textos no locale pedido", body = MenuTree),
        (status = 404, description = "Cardápio não publicado")
    ),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    )
)]
pub async fn menu_tree(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    locale: Locale,
    Path(menu_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tree = app_state
        .menu_service
        .menu_tree(tenant.0, menu_id, &locale.0)
        .await?;
    Ok(Json(tree))
}

// =============================================================================
//  SEÇÕES E ITENS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionPayload {
    /// Título por locale, ex.: {"pt": "Entradas", "en": "Starters"}.
    #[schema(value_type = Object)]
    pub title: BTreeMap<String, String>,

    #[schema(value_type = Option<Object>)]
    pub description: Option<BTreeMap<String, String>>,
}

// POST /api/sections
#[utoipa::path(
    post,
    path = "/api/sections",
    tag = "Menus",
    request_body = CreateSectionPayload,
    responses((status = 201, description = "Seção criada", body = Section)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_section(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermSectionCreate>,
    Json(payload): Json<CreateSectionPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.title.is_empty() {
        return Err(AppError::Validation(
            "title requires at least one translation".into(),
        ));
    }

    let section = app_state
        .menu_service
        .create_section(guard.principal.tenant_id, payload.title, payload.description)
        .await?;

    Ok((StatusCode::CREATED, Json(section)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    /// Seção "casa" do item.
    pub section_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "BURG-001")]
    pub sku: String,

    /// Preço em unidade mínima da moeda (centavos).
    #[validate(range(min = 0, message = "must be non-negative"))]
    #[schema(example = 4590)]
    pub price_amount: i64,

    #[validate(length(equal = 3, message = "ISO 4217 code"))]
    #[schema(example = "BRL")]
    pub price_currency: String,

    #[schema(value_type = Object)]
    pub name: BTreeMap<String, String>,

    #[schema(value_type = Option<Object>)]
    pub description: Option<BTreeMap<String, String>>,

    #[serde(default)]
    #[schema(example = "[\"vegan\"]")]
    pub dietary_flags: Vec<String>,
}

// POST /api/items
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Menus",
    request_body = CreateItemPayload,
    responses((status = 201, description = "Item criado", body = Item)),
    params(("x-tenant-id" = Uuid, Header, description = "ID do tenant")),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermItemCreate>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if payload.name.is_empty() {
        return Err(AppError::Validation(
            "name requires at least one translation".into(),
        ));
    }

    let item = app_state
        .menu_service
        .create_item(
            guard.principal.tenant_id,
            payload.section_id,
            &payload.sku,
            payload.price_amount,
            &payload.price_currency,
            payload.name,
            payload.description,
            payload.dietary_flags,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityPayload {
    pub is_visible: bool,
}

// PATCH /api/items/{item_id}/visibility
#[utoipa::path(
    patch,
    path = "/api/items/{item_id}/visibility",
    tag = "Menus",
    request_body = SetVisibilityPayload,
    responses(
        (status = 200, description = "Visibilidade aplicada em cascata a todas as linhas", body = Item)
    ),
    params(
        ("item_id" = Uuid, Path, description = "ID do item"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_item_visibility(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermItemUpdate>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<SetVisibilityPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state
        .menu_service
        .set_item_visibility(guard.principal.tenant_id, item_id, payload.is_visible)
        .await?;

    Ok(Json(item))
}

// =============================================================================
//  LINHAS (a árvore do cardápio)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddLinePayload {
    pub line_type: LineType,
    pub section_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    /// null/ausente = linha de topo.
    pub parent_line_id: Option<Uuid>,
    /// Ausente = anexa ao final do grupo de irmãos.
    pub display_order: Option<i32>,
}

// POST /api/menus/{menu_id}/lines
#[utoipa::path(
    post,
    path = "/api/menus/{menu_id}/lines",
    tag = "Menus",
    request_body = AddLinePayload,
    responses(
        (status = 201, description = "Linha adicionada", body = MenuLine),
        (status = 400, description = "Posicionamento inválido (pai errado, ciclo, cardápio diferente)")
    ),
    params(
        ("menu_id" = Uuid, Path, description = "ID do cardápio"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_line(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuUpdate>,
    Path(menu_id): Path<Uuid>,
    Json(payload): Json<AddLinePayload>,
) -> Result<impl IntoResponse, AppError> {
    let line = app_state
        .menu_service
        .add_line(
            guard.principal.tenant_id,
            menu_id,
            NewLine {
                line_type: payload.line_type,
                section_id: payload.section_id,
                item_id: payload.item_id,
                parent_line_id: payload.parent_line_id,
                display_order: payload.display_order,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinePayload {
    /// Ausente = não mexe; null explícito = move para o topo.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_line_id: Option<Option<Uuid>>,
    pub display_order: Option<i32>,
    pub is_enabled: Option<bool>,
}

// PATCH /api/lines/{line_id}
#[utoipa::path(
    patch,
    path = "/api/lines/{line_id}",
    tag = "Menus",
    request_body = UpdateLinePayload,
    responses(
        (status = 204, description = "Linha atualizada"),
        (status = 400, description = "Re-parent inválido")
    ),
    params(
        ("line_id" = Uuid, Path, description = "ID da linha"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_line(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuUpdate>,
    Path(line_id): Path<Uuid>,
    Json(payload): Json<UpdateLinePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .menu_service
        .update_line(
            guard.principal.tenant_id,
            line_id,
            LineUpdate {
                parent_line_id: payload.parent_line_id,
                display_order: payload.display_order,
                is_enabled: payload.is_enabled,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/lines/{line_id}
#[utoipa::path(
    delete,
    path = "/api/lines/{line_id}",
    tag = "Menus",
    responses(
        (status = 204, description = "Linha removida; filhos promovidos, irmãos recompactados")
    ),
    params(
        ("line_id" = Uuid, Path, description = "ID da linha"),
        ("x-tenant-id" = Uuid, Header, description = "ID do tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_line(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermMenuUpdate>,
    Path(line_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .menu_service
        .delete_line(guard.principal.tenant_id, line_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
