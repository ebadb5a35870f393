// src/db/publication_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PublicationStore;
use crate::models::publication::MenuPublication;

const PUBLICATION_COLUMNS: &str =
    "id, tenant_id, menu_id, location_id, is_current, published_at, updated_at";

#[derive(Clone)]
pub struct PublicationRepository {
    pool: PgPool,
}

impl PublicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublicationStore for PublicationRepository {
    async fn activate(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
        menu_id: Uuid,
    ) -> Result<MenuPublication, AppError> {
        // O índice único em (location_id, menu_id) torna a ativação
        // idempotente mesmo sob concorrência: duas chamadas simultâneas
        // convergem para um único registro corrente.
        let publication = sqlx::query_as::<_, MenuPublication>(&format!(
            "INSERT INTO menu_publications (id, tenant_id, menu_id, location_id, is_current) \
             VALUES ($1, $2, $3, $4, TRUE) \
             ON CONFLICT (location_id, menu_id) \
             DO UPDATE SET is_current = TRUE, updated_at = now() \
             RETURNING {PUBLICATION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(menu_id)
        .bind(location_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(publication)
    }

    async fn find(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
    ) -> Result<Option<MenuPublication>, AppError> {
        let publication = sqlx::query_as::<_, MenuPublication>(&format!(
            "SELECT {PUBLICATION_COLUMNS} FROM menu_publications \
             WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(publication_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publication)
    }

    async fn set_current(
        &self,
        tenant_id: Uuid,
        publication_id: Uuid,
        is_current: bool,
    ) -> Result<MenuPublication, AppError> {
        let publication = sqlx::query_as::<_, MenuPublication>(&format!(
            "UPDATE menu_publications SET is_current = $1, updated_at = now() \
             WHERE id = $2 AND tenant_id = $3 \
             RETURNING {PUBLICATION_COLUMNS}"
        ))
        .bind(is_current)
        .bind(publication_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(publication)
    }

    async fn list_current_for_location(
        &self,
        tenant_id: Uuid,
        location_id: Uuid,
    ) -> Result<Vec<MenuPublication>, AppError> {
        let publications = sqlx::query_as::<_, MenuPublication>(&format!(
            "SELECT {PUBLICATION_COLUMNS} FROM menu_publications \
             WHERE location_id = $1 AND tenant_id = $2 AND is_current = TRUE \
             ORDER BY published_at"
        ))
        .bind(location_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(publications)
    }
}
