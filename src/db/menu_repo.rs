// src/db/menu_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{LineBatch, MenuStore};
use crate::models::menu::{Item, Menu, MenuLine, MenuStatus, Section};

const MENU_COLUMNS: &str =
    "id, tenant_id, brand_id, code, name, status, is_active, created_at, updated_at";
const SECTION_COLUMNS: &str = "id, tenant_id, is_active, title, description, created_at";
const ITEM_COLUMNS: &str = "id, tenant_id, section_id, sku, price_amount, price_currency, \
     is_visible, dietary_flags, name, description, created_at";
const LINE_COLUMNS: &str = "id, tenant_id, menu_id, line_type, section_id, item_id, \
     parent_line_id, display_order, is_enabled, created_at";

#[derive(Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuStore for MenuRepository {
    async fn create_menu(&self, menu: Menu) -> Result<Menu, AppError> {
        let created = sqlx::query_as::<_, Menu>(&format!(
            "INSERT INTO menus (id, tenant_id, brand_id, code, name, status, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(menu.id)
        .bind(menu.tenant_id)
        .bind(menu.brand_id)
        .bind(&menu.code)
        .bind(&menu.name)
        .bind(menu.status)
        .bind(menu.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("A menu with this code already exists".into());
                }
            }
            e.into()
        })?;

        Ok(created)
    }

    async fn find_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Option<Menu>, AppError> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(menu_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(menu)
    }

    async fn list_menus(&self, tenant_id: Uuid) -> Result<Vec<Menu>, AppError> {
        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE tenant_id = $1 ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(menus)
    }

    async fn set_menu_status(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        status: MenuStatus,
    ) -> Result<Menu, AppError> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "UPDATE menus SET status = $1, updated_at = now() \
             WHERE id = $2 AND tenant_id = $3 \
             RETURNING {MENU_COLUMNS}"
        ))
        .bind(status)
        .bind(menu_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(menu)
    }

    async fn create_section(&self, section: Section) -> Result<Section, AppError> {
        let created = sqlx::query_as::<_, Section>(&format!(
            "INSERT INTO sections (id, tenant_id, is_active, title, description) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {SECTION_COLUMNS}"
        ))
        .bind(section.id)
        .bind(section.tenant_id)
        .bind(section.is_active)
        .bind(&section.title)
        .bind(&section.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_section(
        &self,
        tenant_id: Uuid,
        section_id: Uuid,
    ) -> Result<Option<Section>, AppError> {
        let section = sqlx::query_as::<_, Section>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(section_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    async fn create_item(&self, item: Item) -> Result<Item, AppError> {
        let created = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (id, tenant_id, section_id, sku, price_amount, price_currency, \
             is_visible, dietary_flags, name, description) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(item.tenant_id)
        .bind(item.section_id)
        .bind(&item.sku)
        .bind(item.price_amount)
        .bind(&item.price_currency)
        .bind(item.is_visible)
        .bind(&item.dietary_flags)
        .bind(&item.name)
        .bind(&item.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_item(&self, tenant_id: Uuid, item_id: Uuid) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(item_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn insert_line(&self, line: MenuLine) -> Result<MenuLine, AppError> {
        let created = sqlx::query_as::<_, MenuLine>(&format!(
            "INSERT INTO menu_lines (id, tenant_id, menu_id, line_type, section_id, item_id, \
             parent_line_id, display_order, is_enabled, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {LINE_COLUMNS}"
        ))
        .bind(line.id)
        .bind(line.tenant_id)
        .bind(line.menu_id)
        .bind(line.line_type)
        .bind(line.section_id)
        .bind(line.item_id)
        .bind(line.parent_line_id)
        .bind(line.display_order)
        .bind(line.is_enabled)
        .bind(line.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_line(
        &self,
        tenant_id: Uuid,
        line_id: Uuid,
    ) -> Result<Option<MenuLine>, AppError> {
        let line = sqlx::query_as::<_, MenuLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM menu_lines WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(line_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    async fn list_lines(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
    ) -> Result<Vec<MenuLine>, AppError> {
        // Ordem de criação: é o desempate estável do display_order.
        let lines = sqlx::query_as::<_, MenuLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM menu_lines \
             WHERE menu_id = $1 AND tenant_id = $2 ORDER BY created_at"
        ))
        .bind(menu_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn lines_for_item(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<MenuLine>, AppError> {
        let lines = sqlx::query_as::<_, MenuLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM menu_lines \
             WHERE item_id = $1 AND tenant_id = $2 ORDER BY created_at"
        ))
        .bind(item_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    async fn apply_batch(&self, tenant_id: Uuid, batch: LineBatch) -> Result<(), AppError> {
        // Uma transação para o lote inteiro: re-parent, deleção,
        // compactação e cascata entram juntos ou não entram.
        let mut tx = self.pool.begin().await?;

        for (line_id, new_parent) in &batch.reparent {
            sqlx::query("UPDATE menu_lines SET parent_line_id = $1 WHERE id = $2 AND tenant_id = $3")
                .bind(new_parent)
                .bind(line_id)
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
        }
        for line_id in &batch.delete {
            sqlx::query("DELETE FROM menu_lines WHERE id = $1 AND tenant_id = $2")
                .bind(line_id)
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
        }
        for (line_id, order) in &batch.reorder {
            sqlx::query("UPDATE menu_lines SET display_order = $1 WHERE id = $2 AND tenant_id = $3")
                .bind(order)
                .bind(line_id)
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
        }
        for (line_id, enabled) in &batch.set_enabled {
            sqlx::query("UPDATE menu_lines SET is_enabled = $1 WHERE id = $2 AND tenant_id = $3")
                .bind(enabled)
                .bind(line_id)
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some((item_id, visible)) = batch.item_visibility {
            sqlx::query("UPDATE items SET is_visible = $1 WHERE id = $2 AND tenant_id = $3")
                .bind(visible)
                .bind(item_id)
                .bind(tenant_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
