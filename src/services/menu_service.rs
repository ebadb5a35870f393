// src/services/menu_service.rs

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{LineBatch, MenuStore};
use crate::models::menu::{
    Item, LineType, Menu, MenuLine, MenuStatus, MenuTree, MenuTreeItem, MenuTreeSection, Section,
    resolve_text,
};
use crate::services::menu_tree;

/// Comandos de criação/alteração vindos dos handlers.
#[derive(Debug)]
pub struct NewLine {
    pub line_type: LineType,
    pub section_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub parent_line_id: Option<Uuid>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Default)]
pub struct LineUpdate {
    /// `Some(None)` move a linha para o topo; `None` não mexe no pai.
    pub parent_line_id: Option<Option<Uuid>>,
    pub display_order: Option<i32>,
    pub is_enabled: Option<bool>,
}

#[derive(Clone)]
pub struct MenuService {
    store: Arc<dyn MenuStore>,
}

impl MenuService {
    pub fn new(store: Arc<dyn MenuStore>) -> Self {
        Self { store }
    }

    // --- Cardápios ---

    pub async fn create_menu(
        &self,
        tenant_id: Uuid,
        brand_id: Uuid,
        code: &str,
        name: &str,
    ) -> Result<Menu, AppError> {
        let now = Utc::now();
        self.store
            .create_menu(Menu {
                id: Uuid::new_v4(),
                tenant_id,
                brand_id,
                code: code.to_string(),
                name: name.to_string(),
                status: MenuStatus::Draft,
                is_active: true,
                created_at: Some(now),
                updated_at: Some(now),
            })
            .await
    }

    pub async fn get_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Menu, AppError> {
        self.store
            .find_menu(tenant_id, menu_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn list_menus(&self, tenant_id: Uuid) -> Result<Vec<Menu>, AppError> {
        self.store.list_menus(tenant_id).await
    }

    /// Transição de status validada pela máquina de estados do Menu.
    async fn transition(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        to: MenuStatus,
    ) -> Result<Menu, AppError> {
        let menu = self.get_menu(tenant_id, menu_id).await?;
        if !menu.status.can_transition(to) {
            return Err(AppError::InvalidTransition { from: menu.status, to });
        }
        self.store.set_menu_status(tenant_id, menu_id, to).await
    }

    pub async fn publish_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Menu, AppError> {
        self.transition(tenant_id, menu_id, MenuStatus::Published).await
    }

    pub async fn unpublish_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Menu, AppError> {
        self.transition(tenant_id, menu_id, MenuStatus::Draft).await
    }

    pub async fn archive_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Menu, AppError> {
        self.transition(tenant_id, menu_id, MenuStatus::Archived).await
    }

    // --- Seções e itens (entidades reutilizáveis do tenant) ---

    pub async fn create_section(
        &self,
        tenant_id: Uuid,
        title: BTreeMap<String, String>,
        description: Option<BTreeMap<String, String>>,
    ) -> Result<Section, AppError> {
        self.store
            .create_section(Section {
                id: Uuid::new_v4(),
                tenant_id,
                is_active: true,
                title: Json(title),
                description: description.map(Json),
                created_at: Some(Utc::now()),
            })
            .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_item(
        &self,
        tenant_id: Uuid,
        section_id: Uuid,
        sku: &str,
        price_amount: i64,
        price_currency: &str,
        name: BTreeMap<String, String>,
        description: Option<BTreeMap<String, String>>,
        dietary_flags: Vec<String>,
    ) -> Result<Item, AppError> {
        self.store
            .find_section(tenant_id, section_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.store
            .create_item(Item {
                id: Uuid::new_v4(),
                tenant_id,
                section_id,
                sku: sku.to_string(),
                price_amount,
                price_currency: price_currency.to_string(),
                is_visible: true,
                dietary_flags,
                name: Json(name),
                description: description.map(Json),
                created_at: Some(Utc::now()),
            })
            .await
    }

    // --- Linhas ---

    async fn editable_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Menu, AppError> {
        let menu = self.get_menu(tenant_id, menu_id).await?;
        if menu.status == MenuStatus::Archived {
            return Err(AppError::Validation("Cannot edit an archived menu".into()));
        }
        Ok(menu)
    }

    pub async fn add_line(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        new_line: NewLine,
    ) -> Result<MenuLine, AppError> {
        self.editable_menu(tenant_id, menu_id).await?;

        // A referência precisa bater com o tipo da linha.
        let (section_id, item_id, is_enabled) = match new_line.line_type {
            LineType::Section => {
                let section_id = new_line.section_id.ok_or_else(|| {
                    AppError::Validation("A section line requires sectionId".into())
                })?;
                self.store
                    .find_section(tenant_id, section_id)
                    .await?
                    .ok_or(AppError::NotFound)?;
                (Some(section_id), None, true)
            }
            LineType::Item => {
                let item_id = new_line
                    .item_id
                    .ok_or_else(|| AppError::Validation("An item line requires itemId".into()))?;
                let item = self
                    .store
                    .find_item(tenant_id, item_id)
                    .await?
                    .ok_or(AppError::NotFound)?;
                // Nasce espelhando a visibilidade global do item.
                (None, Some(item_id), item.is_visible)
            }
        };

        let lines = self.store.list_lines(tenant_id, menu_id).await?;
        menu_tree::validate_placement(&lines, new_line.line_type, new_line.parent_line_id, None)?;

        let display_order = new_line
            .display_order
            .unwrap_or_else(|| menu_tree::next_display_order(&lines, new_line.parent_line_id));

        self.store
            .insert_line(MenuLine {
                id: Uuid::new_v4(),
                tenant_id,
                menu_id,
                line_type: new_line.line_type,
                section_id,
                item_id,
                parent_line_id: new_line.parent_line_id,
                display_order,
                is_enabled,
                created_at: Utc::now(),
            })
            .await
    }

    pub async fn update_line(
        &self,
        tenant_id: Uuid,
        line_id: Uuid,
        update: LineUpdate,
    ) -> Result<(), AppError> {
        let line = self
            .store
            .find_line(tenant_id, line_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.editable_menu(tenant_id, line.menu_id).await?;
        let lines = self.store.list_lines(tenant_id, line.menu_id).await?;

        let mut batch = LineBatch::default();
        if let Some(new_parent) = update.parent_line_id {
            if new_parent != line.parent_line_id {
                batch = menu_tree::plan_reparent(&lines, &line, new_parent)?;
            }
        }
        if let Some(order) = update.display_order {
            // Rank explícito do cliente; compactação só acontece em deleções.
            batch.reorder.push((line.id, order));
        }
        if let Some(enabled) = update.is_enabled {
            batch.set_enabled.push((line.id, enabled));
        }

        if batch.is_empty() {
            return Ok(());
        }
        self.store.apply_batch(tenant_id, batch).await
    }

    pub async fn delete_line(&self, tenant_id: Uuid, line_id: Uuid) -> Result<(), AppError> {
        let line = self
            .store
            .find_line(tenant_id, line_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.editable_menu(tenant_id, line.menu_id).await?;
        let lines = self.store.list_lines(tenant_id, line.menu_id).await?;
        let batch = menu_tree::plan_delete(&lines, &line);
        self.store.apply_batch(tenant_id, batch).await
    }

    /// Cascata de visibilidade: o flag global do item e o `is_enabled`
    /// de TODA linha que o referencia (em todos os cardápios do tenant)
    /// mudam juntos, na mesma transação.
    pub async fn set_item_visibility(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
        is_visible: bool,
    ) -> Result<Item, AppError> {
        self.store
            .find_item(tenant_id, item_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let lines = self.store.lines_for_item(tenant_id, item_id).await?;
        let batch = LineBatch {
            set_enabled: lines.iter().map(|l| (l.id, is_visible)).collect(),
            item_visibility: Some((item_id, is_visible)),
            ..Default::default()
        };
        self.store.apply_batch(tenant_id, batch).await?;

        self.store
            .find_item(tenant_id, item_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    // --- Saída publicada ---

    /// Árvore do cardápio publicado, com textos resolvidos por locale.
    /// Cardápio arquivado (ou rascunho) não existe para este caminho.
    pub async fn menu_tree(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        locale: &str,
    ) -> Result<MenuTree, AppError> {
        let menu = self.get_menu(tenant_id, menu_id).await?;
        if menu.status != MenuStatus::Published {
            return Err(AppError::NotFound);
        }

        let all_lines = self.store.list_lines(tenant_id, menu_id).await?;
        let lines: Vec<MenuLine> = all_lines.into_iter().filter(|l| l.is_enabled).collect();

        let mut sections = Vec::new();
        let mut loose_items = Vec::new();

        // DFS iterativo: subseções entram na fila logo após o pai, então
        // a lista achatada sai em ordem de exibição.
        let mut pending: VecDeque<&MenuLine> = VecDeque::new();
        for line in menu_tree::ordered_children(&lines, None) {
            match line.line_type {
                LineType::Section => pending.push_back(line),
                LineType::Item => {
                    if let Some(item) = self.tree_item(tenant_id, line, locale).await? {
                        loose_items.push(item);
                    }
                }
            }
        }

        while let Some(line) = pending.pop_front() {
            let Some(section_id) = line.section_id else {
                continue;
            };
            let Some(section) = self.store.find_section(tenant_id, section_id).await? else {
                continue;
            };
            if !section.is_active {
                continue;
            }

            let mut items = Vec::new();
            let mut subsections = Vec::new();
            for child in menu_tree::ordered_children(&lines, Some(line.id)) {
                match child.line_type {
                    LineType::Item => {
                        if let Some(item) = self.tree_item(tenant_id, child, locale).await? {
                            items.push(item);
                        }
                    }
                    LineType::Section => subsections.push(child),
                }
            }
            for sub in subsections.into_iter().rev() {
                pending.push_front(sub);
            }

            sections.push(MenuTreeSection {
                line_id: line.id,
                section_id,
                title: resolve_text(&section.title, locale).unwrap_or_default(),
                description: section
                    .description
                    .as_ref()
                    .and_then(|d| resolve_text(d, locale)),
                items,
            });
        }

        Ok(MenuTree {
            menu_id: menu.id,
            code: menu.code,
            name: menu.name,
            sections,
            items: loose_items,
        })
    }

    async fn tree_item(
        &self,
        tenant_id: Uuid,
        line: &MenuLine,
        locale: &str,
    ) -> Result<Option<MenuTreeItem>, AppError> {
        let Some(item_id) = line.item_id else {
            return Ok(None);
        };
        let Some(item) = self.store.find_item(tenant_id, item_id).await? else {
            return Ok(None);
        };
        if !item.is_visible {
            return Ok(None);
        }
        Ok(Some(MenuTreeItem {
            line_id: line.id,
            item_id,
            name: resolve_text(&item.name, locale).unwrap_or_default(),
            description: item
                .description
                .as_ref()
                .and_then(|d| resolve_text(d, locale)),
            sku: item.sku,
            price_amount: item.price_amount,
            price_currency: item.price_currency,
            dietary_flags: item.dietary_flags,
        }))
    }
}
