// src/models/menu.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::TenantScoped;

/// Textos traduzidos por locale ("pt" -> "...", "en" -> "...").
/// BTreeMap para o fallback ser determinístico.
pub type Translations = Json<BTreeMap<String, String>>;

/// Resolve o texto para o locale pedido, caindo para "en" e por fim
/// para qualquer tradução disponível.
pub fn resolve_text(map: &BTreeMap<String, String>, locale: &str) -> Option<String> {
    map.get(locale)
        .or_else(|| map.get("en"))
        .or_else(|| map.values().next())
        .cloned()
}

// --- Enums ---

/// Ciclo de vida do cardápio. Avanço é monotônico, com duas exceções
/// explícitas: despublicar (published -> draft) e arquivar (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "menu_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MenuStatus {
    Draft,
    Published,
    Archived,
}

impl MenuStatus {
    pub fn can_transition(self, to: MenuStatus) -> bool {
        use MenuStatus::*;
        matches!(
            (self, to),
            (Draft, Published) | (Published, Draft) | (Draft, Archived) | (Published, Archived)
        )
    }
}

impl fmt::Display for MenuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MenuStatus::Draft => "draft",
            MenuStatus::Published => "published",
            MenuStatus::Archived => "archived",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "line_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Section,
    Item,
}

// --- Entidades ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub brand_id: Uuid,
    #[schema(example = "almoco-verao")]
    pub code: String,
    #[schema(example = "Almoço de Verão")]
    pub name: String,
    pub status: MenuStatus,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Seção reutilizável, escopada ao tenant. Não pertence a um cardápio:
/// vários cardápios podem referenciá-la via MenuLine.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub is_active: bool,
    #[schema(value_type = Object)]
    pub title: Translations,
    #[schema(value_type = Option<Object>)]
    pub description: Option<Translations>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    /// Seção "casa" do item (organizacional, não restringe o reuso).
    pub section_id: Uuid,
    #[schema(example = "BURG-001")]
    pub sku: String,
    /// Preço em unidade mínima da moeda (centavos), nunca ponto flutuante.
    #[schema(example = 4590)]
    pub price_amount: i64,
    #[schema(example = "BRL")]
    pub price_currency: String,
    pub is_visible: bool,
    #[schema(example = "[\"vegan\",\"gluten_free\"]")]
    pub dietary_flags: Vec<String>,
    #[schema(value_type = Object)]
    pub name: Translations,
    #[schema(value_type = Option<Object>)]
    pub description: Option<Translations>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Linha de cardápio: posiciona uma Section ou um Item dentro de um
/// Menu específico, formando a árvore via `parent_line_id` explícito.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuLine {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub menu_id: Uuid,
    pub line_type: LineType,
    pub section_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    /// NULL = linha de topo. Linhas de item sempre apontam para uma
    /// linha de seção do MESMO cardápio.
    pub parent_line_id: Option<Uuid>,
    /// Rank entre irmãos (único, não necessariamente contíguo;
    /// compactado para 0..n-1 após deleções).
    pub display_order: i32,
    /// false esconde a linha da saída publicada sem removê-la.
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl TenantScoped for Menu {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScoped for Section {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScoped for Item {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl TenantScoped for MenuLine {
    fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

// --- Saída publicada (árvore resolvida por locale) ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuTree {
    pub menu_id: Uuid,
    pub code: String,
    pub name: String,
    pub sections: Vec<MenuTreeSection>,
    /// Itens promovidos ao topo por remoção da seção pai.
    pub items: Vec<MenuTreeItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuTreeSection {
    pub line_id: Uuid,
    pub section_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub items: Vec<MenuTreeItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuTreeItem {
    pub line_id: Uuid,
    pub item_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub price_amount: i64,
    pub price_currency: String,
    pub dietary_flags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions() {
        use MenuStatus::*;
        assert!(Draft.can_transition(Published));
        assert!(Published.can_transition(Draft)); // despublicar é explícito
        assert!(Draft.can_transition(Archived));
        assert!(Published.can_transition(Archived));
        // arquivado é terminal
        assert!(!Archived.can_transition(Draft));
        assert!(!Archived.can_transition(Published));
        // sem auto-transição
        assert!(!Draft.can_transition(Draft));
        assert!(!Published.can_transition(Published));
    }

    #[test]
    fn translation_fallback_is_deterministic() {
        let mut map = BTreeMap::new();
        map.insert("pt".to_string(), "Entradas".to_string());
        map.insert("en".to_string(), "Starters".to_string());
        assert_eq!(resolve_text(&map, "pt").as_deref(), Some("Entradas"));
        assert_eq!(resolve_text(&map, "fr").as_deref(), Some("Starters"));

        let mut only_pt = BTreeMap::new();
        only_pt.insert("pt".to_string(), "Entradas".to_string());
        assert_eq!(resolve_text(&only_pt, "fr").as_deref(), Some("Entradas"));
        assert_eq!(resolve_text(&BTreeMap::new(), "pt"), None);
    }
}
