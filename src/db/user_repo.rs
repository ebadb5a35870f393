// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PrincipalStore;
use crate::models::auth::StaffUser;

const STAFF_COLUMNS: &str = "id, tenant_id, email, password_hash, role, permissions, \
     location_ids, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalStore for UserRepository {
    async fn find_auth_user(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<StaffUser>, AppError> {
        let user = sqlx::query_as::<_, StaffUser>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff_users \
             WHERE id = $1 AND tenant_id = $2 AND is_active = TRUE"
        ))
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<StaffUser>, AppError> {
        let user = sqlx::query_as::<_, StaffUser>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff_users WHERE email = $1 AND is_active = TRUE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_staff(&self, tenant_id: Uuid) -> Result<Vec<StaffUser>, AppError> {
        let staff = sqlx::query_as::<_, StaffUser>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff_users WHERE tenant_id = $1 ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }

    async fn create_staff(&self, user: StaffUser) -> Result<StaffUser, AppError> {
        let created = sqlx::query_as::<_, StaffUser>(&format!(
            "INSERT INTO staff_users \
             (id, tenant_id, email, password_hash, role, permissions, location_ids, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(user.id)
        .bind(user.tenant_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(&user.permissions)
        .bind(&user.location_ids)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Email already in use".into());
                }
            }
            e.into()
        })?;

        Ok(created)
    }

    async fn update_staff_access(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        role: &str,
        permissions: Option<Vec<String>>,
    ) -> Result<StaffUser, AppError> {
        let updated = sqlx::query_as::<_, StaffUser>(&format!(
            "UPDATE staff_users SET role = $1, permissions = $2, updated_at = now() \
             WHERE id = $3 AND tenant_id = $4 \
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(role)
        .bind(&permissions)
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;

        Ok(updated)
    }

    async fn delete_staff(&self, tenant_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM staff_users WHERE id = $1 AND tenant_id = $2")
            .bind(user_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
