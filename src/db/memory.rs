// src/db/memory.rs
//
// Implementação em memória dos contratos de persistência. Usada pelos
// testes de integração; o knob `fail_next_batch` simula uma falha de
// transação para verificar que os lotes são tudo-ou-nada.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{LineBatch, MenuStore, PrincipalStore, PublicationStore};
use crate::models::auth::StaffUser;
use crate::models::menu::{Item, Menu, MenuLine, MenuStatus, Section};
use crate::models::publication::MenuPublication;

#[derive(Default, Clone)]
struct MemoryInner {
    users: Vec<StaffUser>,
    menus: HashMap<Uuid, Menu>,
    sections: HashMap<Uuid, Section>,
    items: HashMap<Uuid, Item>,
    // Vec para preservar a ordem de criação das linhas.
    lines: Vec<MenuLine>,
    // Chave natural da publicação: (location_id, menu_id).
    publications: HashMap<(Uuid, Uuid), MenuPublication>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_next_batch: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz a próxima `apply_batch` falhar sem tocar no estado.
    pub fn fail_next_batch(&self) {
        self.fail_next_batch.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_auth_user(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<StaffUser>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.id == user_id && u.tenant_id == tenant_id && u.is_active)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StaffUser>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email == email && u.is_active)
            .cloned())
    }

    async fn list_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffUser>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn create_staff(&self, user: StaffUser) -> Result<StaffUser, AppError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already in use".into()));
        }
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn update_staff_access(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: &str,
        permissions: Option<Vec<String>>,
    ) -> Result<StaffUser, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == user_id && u.tenant_id == tenant_id)
            .ok_or(AppError::NotFound)?;
        user.role = role.to_string();
        user.permissions = permissions;
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn delete_staff(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner
            .users
            .retain(|u| !(u.id == user_id && u.tenant_id == tenant_id));
        if inner.users.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl MenuStore for MemoryStore {
    async fn create_menu(&self, menu: Menu) -> Result<Menu, AppError> {
        let mut inner = self.inner.lock().unwrap();
        // Mesma unicidade (tenant, code) do índice do Postgres.
        if inner
            .menus
            .values()
            .any(|m| m.tenant_id == menu.tenant_id && m.code == menu.code)
        {
            return Err(AppError::Conflict(
                "A menu with this code already exists".into(),
            ));
        }
        inner.menus.insert(menu.id, menu.clone());
        Ok(menu)
    }

    async fn find_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Option<Menu>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .menus
            .get(&menu_id)
            .filter(|m| m.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_menus(&self, tenant_id: Uuid) -> Result<Vec<Menu>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut menus: Vec<Menu> = inner
            .menus
            .values()
            .filter(|m| m.tenant_id == tenant_id)
            .cloned()
            .collect();
        menus.sort_by_key(|m| m.created_at);
        Ok(menus)
    }

    async fn set_menu_status(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        status: MenuStatus,
    ) -> Result<Menu, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let menu = inner
            .menus
            .get_mut(&menu_id)
            .filter(|m| m.tenant_id == tenant_id)
            .ok_or(AppError::NotFound)?;
        menu.status = status;
        menu.updated_at = Some(Utc::now());
        Ok(menu.clone())
    }

    async fn create_section(&self, section: Section) -> Result<Section, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.sections.insert(section.id, section.clone());
        Ok(section)
    }

    async fn find_section(
        &self,
        tenant_id: Uuid,
        section_id: Uuid,
    ) -> Result<Option<Section>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sections
            .get(&section_id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn create_item(&self, item: Item) -> Result<Item, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_item(&self, tenant_id: Uuid, item_id: Uuid) -> Result<Option<Item>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .items
            .get(&item_id)
            .filter(|i| i.tenant_id == tenant_id)
            .cloned())
    }

    async fn insert_line(&self, line: MenuLine) -> Result<MenuLine, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.lines.push(line.clone());
        Ok(line)
    }

    async fn find_line(
        &self,
        tenant_id: Uuid,
        line_id: Uuid,
    ) -> Result<Option<MenuLine>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .lines
            .iter()
            .find(|l| l.id == line_id && l.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_lines(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
    ) -> Result<Vec<MenuLine>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .lines
            .iter()
            .filter(|l| l.menu_id == menu_id && l.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn lines_for_item(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<MenuLine>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .lines
            .iter()
            .filter(|l| l.item_id == Some(item_id) && l.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn apply_batch(&self, tenant_id: Uuid, batch: LineBatch) -> Result<(), AppError> {
        if self.fail_next_batch.swap(false, Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow!("simulated storage failure")));
        }

        let mut inner = self.inner.lock().unwrap();
        // Aplica sobre uma cópia e só troca no final: erro no meio do
        // lote deixa o estado original intacto, como a transação Pg.
        let mut staged = inner.clone();

        for (line_id, new_parent) in &batch.reparent {
            let line = staged
                .lines
                .iter_mut()
                .find(|l| l.id == *line_id && l.tenant_id == tenant_id)
                .ok_or(AppError::NotFound)?;
            line.parent_line_id = *new_parent;
        }
        for line_id in &batch.delete {
            let before = staged.lines.len();
            staged
                .lines
                .retain(|l| !(l.id == *line_id && l.tenant_id == tenant_id));
            if staged.lines.len() == before {
                return Err(AppError::NotFound);
            }
        }
        for (line_id, order) in &batch.reorder {
            let line = staged
                .lines
                .iter_mut()
                .find(|l| l.id == *line_id && l.tenant_id == tenant_id)
                .ok_or(AppError::NotFound)?;
            line.display_order = *order;
        }
        for (line_id, enabled) in &batch.set_enabled {
            let line = staged
                .lines
                .iter_mut()
                .find(|l| l.id == *line_id && l.tenant_id == tenant_id)
                .ok_or(AppError::NotFound)?;
            line.is_enabled = *enabled;
        }
        if let Some((item_id, visible)) = batch.item_visibility {
            let item = staged
                .items
                .get_mut(&item_id)
                .filter(|i| i.tenant_id == tenant_id)
                .ok_or(AppError::NotFound)?;
            item.is_visible = visible;
        }

        *inner = staged;
        Ok(())
    }
}

#[async_trait]
impl PublicationStore for MemoryStore {
    async fn activate(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
        menu_id: Uuid,
    ) -> Result<MenuPublication, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let publication = inner
            .publications
            .entry((location_id, menu_id))
            .and_modify(|p| {
                p.is_current = true;
                p.updated_at = now;
            })
            .or_insert_with(|| MenuPublication {
                id: Uuid::new_v4(),
                tenant_id,
                menu_id,
                location_id,
                is_current: true,
                published_at: now,
                updated_at: now,
            });
        Ok(publication.clone())
    }

    async fn find(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
    ) -> Result<Option<MenuPublication>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .publications
            .values()
            .find(|p| p.id == publication_id && p.tenant_id == tenant_id)
            .cloned())
    }

    async fn set_current(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
        is_current: bool,
    ) -> Result<MenuPublication, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let publication = inner
            .publications
            .values_mut()
            .find(|p| p.id == publication_id && p.tenant_id == tenant_id)
            .ok_or(AppError::NotFound)?;
        publication.is_current = is_current;
        publication.updated_at = Utc::now();
        Ok(publication.clone())
    }

    async fn list_current_for_location(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<MenuPublication>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut current: Vec<MenuPublication> = inner
            .publications
            .values()
            .filter(|p| p.tenant_id == tenant_id && p.location_id == location_id && p.is_current)
            .cloned()
            .collect();
        current.sort_by_key(|p| p.published_at);
        Ok(current)
    }
}
