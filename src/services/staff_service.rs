// src/services/staff_service.rs
//
// Gestão de equipe. Toda mutação passa pelas duas regras de hierarquia:
// só se gerencia quem está ESTRITAMENTE abaixo, e só se atribui cargo
// ESTRITAMENTE abaixo do próprio.

use std::sync::Arc;

use bcrypt::{DEFAULT_COST, hash};
use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PrincipalStore;
use crate::models::auth::{Principal, StaffUser};
use crate::rbac::catalog::{PermissionKey, RoleCatalog};
use crate::rbac::policy;

#[derive(Debug)]
pub struct NewStaff {
    pub email: String,
    pub password: String,
    pub role: String,
    pub permissions: Option<Vec<String>>,
    pub location_ids: Vec<Uuid>,
}

#[derive(Clone)]
pub struct StaffService {
    users: Arc<dyn PrincipalStore>,
    catalog: Arc<RoleCatalog>,
}

impl StaffService {
    pub fn new(users: Arc<dyn PrincipalStore>, catalog: Arc<RoleCatalog>) -> Self {
        Self { users, catalog }
    }

    pub async fn list(&self, principal: &Principal) -> Result<Vec<StaffUser>, AppError> {
        self.users.list_staff(principal.tenant_id).await
    }

    /// Valida o cargo e o override contra o catálogo antes de persistir.
    fn validate_access(
        &self,
        role: &str,
        permissions: Option<&[String]>,
    ) -> Result<(), AppError> {
        if self.catalog.role(role).is_none() {
            return Err(AppError::Validation(format!("Unknown role '{role}'")));
        }
        if let Some(slugs) = permissions {
            for slug in slugs {
                slug.parse::<PermissionKey>()
                    .map_err(|e| AppError::Validation(e.to_string()))?;
            }
        }
        Ok(())
    }

    pub async fn create(
        &self,
        principal: &Principal,
        new_staff: NewStaff,
    ) -> Result<StaffUser, AppError> {
        if !policy::can_assign_role(&self.catalog, principal, &new_staff.role) {
            return Err(AppError::CannotAssignRole);
        }
        self.validate_access(&new_staff.role, new_staff.permissions.as_deref())?;

        // Hashing fora do runtime, como em qualquer caminho de senha.
        let password = new_staff.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("falha na task de hashing: {e}"))??;

        let now = Utc::now();
        self.users
            .create_staff(StaffUser {
                id: Uuid::new_v4(),
                tenant_id: principal.tenant_id,
                email: new_staff.email,
                password_hash,
                role: new_staff.role,
                permissions: new_staff.permissions,
                location_ids: new_staff.location_ids,
                is_active: true,
                created_at: Some(now),
                updated_at: Some(now),
            })
            .await
    }

    /// Troca cargo e override de uma vez. Exige hierarquia sobre o
    /// cargo ATUAL do alvo e sobre o cargo NOVO.
    pub async fn update_access(
        &self,
        principal: &Principal,
        user_id: Uuid,
        role: &str,
        permissions: Option<Vec<String>>,
    ) -> Result<StaffUser, AppError> {
        let target = self
            .users
            .find_auth_user(user_id, principal.tenant_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !policy::can_manage_user(&self.catalog, principal, &target.role) {
            return Err(AppError::CannotManageUser);
        }
        if !policy::can_assign_role(&self.catalog, principal, role) {
            return Err(AppError::CannotAssignRole);
        }
        self.validate_access(role, permissions.as_deref())?;

        self.users
            .update_staff_access(principal.tenant_id, user_id, role, permissions)
            .await
    }

    pub async fn remove(&self, principal: &Principal, user_id: Uuid) -> Result<(), AppError> {
        let target = self
            .users
            .find_auth_user(user_id, principal.tenant_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !policy::can_manage_user(&self.catalog, principal, &target.role) {
            return Err(AppError::CannotManageUser);
        }

        self.users.delete_staff(principal.tenant_id, user_id).await
    }
}
