// src/db/mod.rs
//
// Contratos de persistência consumidos pelo core. Os repositórios
// Postgres implementam os traits; `memory::MemoryStore` implementa os
// mesmos contratos para os testes de integração (com injeção de falha
// para exercitar a atomicidade dos lotes).

pub mod memory;
pub mod menu_repo;
pub mod publication_repo;
pub mod user_repo;

pub use memory::MemoryStore;
pub use menu_repo::MenuRepository;
pub use publication_repo::PublicationRepository;
pub use user_repo::UserRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::auth::StaffUser;
use crate::models::menu::{Item, Menu, MenuLine, MenuStatus, Section};
use crate::models::publication::MenuPublication;

/// Lote de mutações da árvore de linhas, aplicado numa única transação.
/// Ordem canônica de aplicação: reparent -> delete -> reorder ->
/// set_enabled -> item_visibility. Aplicação parcial é proibida: ou o
/// lote inteiro entra, ou o estado anterior permanece intacto.
#[derive(Debug, Default, Clone)]
pub struct LineBatch {
    pub reparent: Vec<(Uuid, Option<Uuid>)>,
    pub delete: Vec<Uuid>,
    pub reorder: Vec<(Uuid, i32)>,
    pub set_enabled: Vec<(Uuid, bool)>,
    /// Atualização acoplada do `is_visible` do item (cascata de visibilidade).
    pub item_visibility: Option<(Uuid, bool)>,
}

impl LineBatch {
    pub fn is_empty(&self) -> bool {
        self.reparent.is_empty()
            && self.delete.is_empty()
            && self.reorder.is_empty()
            && self.set_enabled.is_empty()
            && self.item_visibility.is_none()
    }
}

/// Busca de identidade + permissões correntes. O guard faz exatamente
/// UMA leitura por requisição; nada aqui pode ser cacheado além dela.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    /// Usuário ativo do tenant, com cargo e override frescos.
    async fn find_auth_user(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<StaffUser>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<StaffUser>, AppError>;

    async fn list_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffUser>, AppError>;

    async fn create_staff(&self, user: StaffUser) -> Result<StaffUser, AppError>;

    /// Define cargo e override de uma vez (estado completo, não patch).
    /// `permissions = None` limpa o override e volta ao padrão do cargo.
    async fn update_staff_access(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: &str,
        permissions: Option<Vec<String>>,
    ) -> Result<StaffUser, AppError>;

    async fn delete_staff(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn create_menu(&self, menu: Menu) -> Result<Menu, AppError>;
    async fn find_menu(&self, tenant_id: Uuid, menu_id: Uuid) -> Result<Option<Menu>, AppError>;
    async fn list_menus(&self, tenant_id: Uuid) -> Result<Vec<Menu>, AppError>;
    async fn set_menu_status(
        &self,
        tenant_id: Uuid,
        menu_id: Uuid,
        status: MenuStatus,
    ) -> Result<Menu, AppError>;

    async fn create_section(&self, section: Section) -> Result<Section, AppError>;
    async fn find_section(
        &self,
        tenant_id: Uuid,
        section_id: Uuid,
    ) -> Result<Option<Section>, AppError>;

    async fn create_item(&self, item: Item) -> Result<Item, AppError>;
    async fn find_item(&self, tenant_id: Uuid, item_id: Uuid) -> Result<Option<Item>, AppError>;

    async fn insert_line(&self, line: MenuLine) -> Result<MenuLine, AppError>;
    async fn find_line(
        &self,
        tenant_id: Uuid,
        line_id: Uuid,
    ) -> Result<Option<MenuLine>, AppError>;

    /// Linhas do cardápio em ordem de criação. O planner da árvore
    /// depende dessa ordem como desempate estável do `display_order`.
    async fn list_lines(&self, tenant_id: Uuid, menu_id: Uuid)
    -> Result<Vec<MenuLine>, AppError>;

    /// Linhas de item referenciando o item, em TODOS os cardápios do tenant.
    async fn lines_for_item(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<MenuLine>, AppError>;

    /// Aplica o lote atomicamente (ver doc de `LineBatch`).
    async fn apply_batch(&self, tenant_id: Uuid, batch: LineBatch) -> Result<(), AppError>;
}

#[async_trait]
pub trait PublicationStore: Send + Sync {
    /// Upsert idempotente chaveado em `(location_id, menu_id)`:
    /// duas ativações simultâneas resultam num único registro corrente.
    async fn activate(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
        menu_id: Uuid,
    ) -> Result<MenuPublication, AppError>;

    async fn find(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
    ) -> Result<Option<MenuPublication>, AppError>;

    async fn set_current(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
        is_current: bool,
    ) -> Result<MenuPublication, AppError>;

    async fn list_current_for_location(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<MenuPublication>, AppError>;
}
