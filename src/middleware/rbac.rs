// src/middleware/rbac.rs
//
// Extractors-guardiões no estilo "tipo por permissão": o handler
// declara `RequirePermission<PermMenuUpdate>` na assinatura e recebe o
// Principal já autorizado. A checagem real (leitura fresca + policy)
// acontece no `AuthGuard`.

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::auth::{Identity, Principal},
    rbac::catalog::{Action, PermissionKey, Resource},
};

/// Uma permissão exigível em rota.
pub trait PermissionDef: Send + Sync + 'static {
    fn key() -> PermissionKey;
}

/// Extractor que exige autenticação + a permissão `T`.
pub struct RequirePermission<T: PermissionDef> {
    pub principal: Principal,
    _marker: PhantomData<T>,
}

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let identity = parts.extensions.get::<Identity>().cloned();
        let tenant = TenantContext::from_request_parts(parts, state).await?;

        let principal = app_state
            .guard
            .require_permission(identity.as_ref(), tenant.0, T::key())
            .await?;

        Ok(Self {
            principal,
            _marker: PhantomData,
        })
    }
}

/// Extractor que exige só autenticação (ex.: GET /me).
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let identity = parts.extensions.get::<Identity>().cloned();
        let tenant = TenantContext::from_request_parts(parts, state).await?;

        let principal = app_state
            .guard
            .require_auth(identity.as_ref(), tenant.0)
            .await?;

        Ok(Self(principal))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $resource:ident, $action:ident) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn key() -> PermissionKey {
                PermissionKey::new(Resource::$resource, Action::$action)
            }
        }
    };
}

permission!(PermMenuRead, Menu, Read);
permission!(PermMenuCreate, Menu, Create);
permission!(PermMenuUpdate, Menu, Update);
permission!(PermMenuDelete, Menu, Delete);
permission!(PermMenuPublish, Menu, Publish);
permission!(PermSectionCreate, Section, Create);
permission!(PermItemCreate, Item, Create);
permission!(PermItemUpdate, Item, Update);
permission!(PermStaffRead, Staff, Read);
permission!(PermStaffCreate, Staff, Create);
permission!(PermStaffUpdate, Staff, Update);
permission!(PermStaffDelete, Staff, Delete);
