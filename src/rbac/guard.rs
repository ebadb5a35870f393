// src/rbac/guard.rs
//
// Guard Layer: liga a identidade da requisição ao Policy Engine e
// traduz as decisões para a taxonomia externa (401/403/404).
//
// Contrato de frescor: `get_auth_user` faz exatamente UMA leitura
// autoritativa por requisição (cargo + override correntes), para que
// edições de permissão valham já na próxima chamada, sem re-login.
// A sessão é só um ponteiro de identidade, nunca cache de permissão.

use std::sync::Arc;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::PrincipalStore;
use crate::models::TenantScoped;
use crate::models::auth::{Identity, Principal};
use crate::rbac::catalog::{PermissionKey, RoleCatalog};
use crate::rbac::policy;

#[derive(Clone)]
pub struct AuthGuard {
    catalog: Arc<RoleCatalog>,
    users: Arc<dyn PrincipalStore>,
}

impl AuthGuard {
    pub fn new(catalog: Arc<RoleCatalog>, users: Arc<dyn PrincipalStore>) -> Self {
        Self { catalog, users }
    }

    /// Resolve o Principal da requisição. `None` = sem sessão (não é erro).
    pub async fn get_auth_user(
        &self,
        identity: Option<&Identity>,
        tenant_id: Uuid,
    ) -> Result<Option<Principal>, AppError> {
        let Some(identity) = identity else {
            return Ok(None);
        };
        let Some(record) = self.users.find_auth_user(identity.user_id, tenant_id).await? else {
            return Ok(None);
        };

        // Parse do override persistido. Chave desconhecida = falha
        // fechada: é ignorada (e logada), nunca concedida.
        let overrides: Option<Vec<PermissionKey>> = record.permissions.as_ref().map(|slugs| {
            slugs
                .iter()
                .filter_map(|s| match s.parse::<PermissionKey>() {
                    Ok(key) => Some(key),
                    Err(err) => {
                        tracing::warn!(user = %record.id, "ignorando override: {err}");
                        None
                    }
                })
                .collect()
        });

        let effective_permissions =
            policy::effective_permissions(&self.catalog, &record.role, overrides.as_deref());

        Ok(Some(Principal {
            id: record.id,
            email: record.email,
            tenant_id: record.tenant_id,
            role: record.role,
            effective_permissions,
            location_ids: record.location_ids,
        }))
    }

    pub async fn require_auth(
        &self,
        identity: Option<&Identity>,
        tenant_id: Uuid,
    ) -> Result<Principal, AppError> {
        self.get_auth_user(identity, tenant_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    pub async fn require_permission(
        &self,
        identity: Option<&Identity>,
        tenant_id: Uuid,
        key: PermissionKey,
    ) -> Result<Principal, AppError> {
        let principal = self.require_auth(identity, tenant_id).await?;
        self.check_permission(&principal, key)?;
        Ok(principal)
    }

    pub fn check_permission(
        &self,
        principal: &Principal,
        key: PermissionKey,
    ) -> Result<(), AppError> {
        if policy::can(&self.catalog, principal, key) {
            Ok(())
        } else {
            Err(AppError::MissingPermission(key))
        }
    }

    /// Escopo de tenant PRIMEIRO: um pedido permitido-mas-no-tenant-errado
    /// responde "não encontrado", nunca "proibido" (não vaza existência).
    pub fn check_resource_access<R: TenantScoped>(
        &self,
        principal: &Principal,
        resource: &R,
        key: PermissionKey,
    ) -> Result<(), AppError> {
        if !policy::can_access_resource(principal, resource) {
            return Err(AppError::NotFound);
        }
        self.check_permission(principal, key)
    }
}
