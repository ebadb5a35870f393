// src/rbac/policy.rs
//
// Policy Engine: decisões puras de autorização, sem nenhum I/O.
// Quem resolve sessão e busca permissões no banco é o guard
// (`rbac::guard`); aqui só entram dados já carregados.

use std::collections::HashSet;

use crate::models::TenantScoped;
use crate::models::auth::Principal;
use crate::rbac::catalog::{PermissionKey, RoleCatalog};

/// Conjunto efetivo do usuário: o array de override, quando presente,
/// SUBSTITUI o padrão do cargo (não mescla). `Some(vazio)` significa
/// "todas as permissões revogadas", não "volta ao padrão".
pub fn effective_permissions(
    catalog: &RoleCatalog,
    role: &str,
    overrides: Option<&[PermissionKey]>,
) -> HashSet<PermissionKey> {
    match overrides {
        Some(keys) => keys.iter().copied().collect(),
        None => catalog.permissions_for_role(role),
    }
}

/// O usuário pode executar a ação?
///
/// Bypass do dono: o cargo superusuário passa por qualquer chave. É um
/// caso especial deliberado e testável, mantido fora do conjunto genérico.
pub fn can(catalog: &RoleCatalog, principal: &Principal, key: PermissionKey) -> bool {
    if catalog.is_superuser(&principal.role) {
        return true;
    }
    principal.effective_permissions.contains(&key)
}

/// Isolamento de tenant: a ÚNICA checagem de escopo de dados.
/// Deve rodar antes de `can` para que "tenant errado" vire 404 e não 403.
pub fn can_access_resource<R: TenantScoped>(principal: &Principal, resource: &R) -> bool {
    principal.tenant_id == resource.tenant_id()
}

/// Gerência de usuários exige cargo ESTRITAMENTE superior ao do alvo.
pub fn can_manage_user(catalog: &RoleCatalog, principal: &Principal, target_role: &str) -> bool {
    catalog.is_role_higher_than(&principal.role, target_role)
}

/// Mesma regra para atribuição: ninguém concede cargo no próprio nível
/// ou acima (bloqueia escalada lateral).
pub fn can_assign_role(catalog: &RoleCatalog, principal: &Principal, target_role: &str) -> bool {
    catalog.is_role_higher_than(&principal.role, target_role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::catalog::roles;
    use uuid::Uuid;

    fn catalog() -> RoleCatalog {
        RoleCatalog::builtin().unwrap()
    }

    fn principal(catalog: &RoleCatalog, role: &str, overrides: Option<&[PermissionKey]>) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "chef@example.com".into(),
            tenant_id: Uuid::new_v4(),
            role: role.to_string(),
            effective_permissions: effective_permissions(catalog, role, overrides),
            location_ids: vec![],
        }
    }

    fn key(s: &str) -> PermissionKey {
        s.parse().unwrap()
    }

    #[test]
    fn override_replaces_role_defaults() {
        let catalog = catalog();
        // O cargo dá menu.read/menu.update; o override concede só brand.read.
        let p = principal(&catalog, roles::MENU_EDITOR, Some(&[key("brand.read")]));
        assert!(!can(&catalog, &p, key("menu.read")));
        assert!(!can(&catalog, &p, key("menu.update")));
        assert!(can(&catalog, &p, key("brand.read")));
    }

    #[test]
    fn empty_override_revokes_everything() {
        let catalog = catalog();
        let p = principal(&catalog, roles::MANAGER, Some(&[]));
        assert!(!can(&catalog, &p, key("menu.read")));
        assert!(!can(&catalog, &p, key("staff.read")));
    }

    #[test]
    fn owner_bypasses_even_an_empty_override() {
        let catalog = catalog();
        let p = principal(&catalog, roles::OWNER, Some(&[]));
        assert!(can(&catalog, &p, key("staff.delete")));
        assert!(can(&catalog, &p, key("menu.publish")));
    }

    #[test]
    fn unknown_role_denies_everything() {
        let catalog = catalog();
        let p = principal(&catalog, "intern", None);
        assert!(p.effective_permissions.is_empty());
        assert!(!can(&catalog, &p, key("menu.read")));
    }

    #[test]
    fn tenant_isolation_is_an_exact_match() {
        let catalog = catalog();
        let p = principal(&catalog, roles::OWNER, None);

        struct Fake(Uuid);
        impl TenantScoped for Fake {
            fn tenant_id(&self) -> Uuid {
                self.0
            }
        }

        assert!(can_access_resource(&p, &Fake(p.tenant_id)));
        // Nem o dono enxerga recursos de outro tenant.
        assert!(!can_access_resource(&p, &Fake(Uuid::new_v4())));
    }

    #[test]
    fn same_level_cannot_manage_or_assign() {
        let catalog = catalog();
        let p = principal(&catalog, roles::MANAGER, None);
        assert!(!can_manage_user(&catalog, &p, roles::MANAGER));
        assert!(!can_assign_role(&catalog, &p, roles::MANAGER));
        assert!(!can_manage_user(&catalog, &p, roles::OWNER));
        assert!(can_manage_user(&catalog, &p, roles::MENU_EDITOR));
        assert!(can_assign_role(&catalog, &p, roles::KITCHEN_STAFF));
    }
}
