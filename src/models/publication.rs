// src/models/publication.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::TenantScoped;

/// Publicação de um cardápio num local. A chave natural é
/// `(location_id, menu_id)`: ativar duas vezes o mesmo par nunca cria
/// dois registros. Vários cardápios podem estar correntes no mesmo
/// local ao mesmo tempo (almoço + bar); desativação é sempre explícita.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuPublication {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub menu_id: Uuid,
    pub location_id: Uuid,
    pub is_current: bool,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for MenuPublication {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

/// Resultado por cardápio da ativação em lote: o lote nunca aborta no
/// primeiro erro, o operador vê o que falhou item a item.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivationOutcome {
    pub menu_id: Uuid,
    pub activated: bool,
    pub error: Option<String>,
    pub publication: Option<MenuPublication>,
}
