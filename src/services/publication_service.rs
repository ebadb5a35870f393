// src/services/publication_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{MenuStore, PublicationStore};
use crate::models::menu::MenuStatus;
use crate::models::publication::{ActivationOutcome, MenuPublication};

/// Máquina de estados da publicação por `(local, cardápio)`.
///
/// Ativar nunca desativa implicitamente outro cardápio no mesmo local:
/// almoço e bar convivem como correntes, e é o operador quem desativa
/// o que não quer mais.
#[derive(Clone)]
pub struct PublicationService {
    publications: Arc<dyn PublicationStore>,
    menus: Arc<dyn MenuStore>,
}

impl PublicationService {
    pub fn new(publications: Arc<dyn PublicationStore>, menus: Arc<dyn MenuStore>) -> Self {
        Self { publications, menus }
    }

    /// Idempotente: reativar um par já corrente só atualiza o timestamp.
    pub async fn activate(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
        menu_id: Uuid,
    ) -> Result<MenuPublication, AppError> {
        let menu = self
            .menus
            .find_menu(tenant_id, menu_id)
            .await?
            .ok_or(AppError::NotFound)?;
        if menu.status != MenuStatus::Published {
            return Err(AppError::Validation(format!(
                "Menu '{}' is not published (status: {})",
                menu.code, menu.status
            )));
        }
        self.publications
            .activate(tenant_id, location_id, menu_id)
            .await
    }

    /// Desativação sempre explícita, por id de publicação.
    pub async fn deactivate(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
    ) -> Result<MenuPublication, AppError> {
        self.publications
            .find(tenant_id, publication_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.publications
            .set_current(tenant_id, publication_id, false)
            .await
    }

    /// Ativação em lote: aplica `activate` em sequência e relata o
    /// resultado cardápio a cardápio em vez de abortar no primeiro erro.
    pub async fn activate_many(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
        menu_ids: &[Uuid],
    ) -> Vec<ActivationOutcome> {
        let mut outcomes = Vec::with_capacity(menu_ids.len());
        for menu_id in menu_ids {
            match self.activate(tenant_id, location_id, *menu_id).await {
                Ok(publication) => outcomes.push(ActivationOutcome {
                    menu_id: *menu_id,
                    activated: true,
                    error: None,
                    publication: Some(publication),
                }),
                Err(err) => {
                    tracing::warn!(menu = %menu_id, location = %location_id, "ativação falhou: {err}");
                    outcomes.push(ActivationOutcome {
                        menu_id: *menu_id,
                        activated: false,
                        error: Some(err.to_string()),
                        publication: None,
                    });
                }
            }
        }
        outcomes
    }

    /// Publicações correntes do local. Cardápios arquivados ficam fora
    /// de todo caminho de publicação, mesmo com registro corrente.
    pub async fn current_for_location(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<MenuPublication>, AppError> {
        let current = self
            .publications
            .list_current_for_location(tenant_id, location_id)
            .await?;
        let mut visible = Vec::with_capacity(current.len());
        for publication in current {
            match self.menus.find_menu(tenant_id, publication.menu_id).await? {
                Some(menu) if menu.status != MenuStatus::Archived => visible.push(publication),
                _ => {}
            }
        }
        Ok(visible)
    }
}
