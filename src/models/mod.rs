pub mod auth;
pub mod menu;
pub mod publication;

use uuid::Uuid;

/// Todo recurso persistido pertence a exatamente um tenant.
/// O Policy Engine usa este trait para a checagem de isolamento.
pub trait TenantScoped {
    fn tenant_id(&self) -> Uuid;
}
