// src/models/auth.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::TenantScoped;
use crate::rbac::catalog::PermissionKey;

/// Claims do JWT. O token é só um ponteiro de identidade: cargo e
/// permissões NÃO entram aqui, são relidos do banco a cada requisição.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
    pub iat: usize,
}

/// Identidade extraída do token pelo middleware de auth.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
}

/// Registro de funcionário como sai do banco (tabela staff_users).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffUser {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "garcom@bistro.com.br")]
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "menu_editor")]
    pub role: String,

    /// Override por usuário. NULL = usa o padrão do cargo;
    /// array presente (mesmo vazio) substitui o padrão por inteiro.
    pub permissions: Option<Vec<String>>,

    /// Restrição opcional de escopo por local.
    pub location_ids: Vec<Uuid>,

    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TenantScoped for StaffUser {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

/// Ator autenticado de UMA requisição. Montado pelo guard a partir do
/// token + uma leitura fresca do banco; nunca sobrevive à requisição.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub tenant_id: Uuid,
    pub role: String,
    pub effective_permissions: HashSet<PermissionKey>,
    pub location_ids: Vec<Uuid>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "invalid email"))]
    #[schema(example = "gerente@bistro.com.br")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
}
