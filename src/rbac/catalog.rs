// src/rbac/catalog.rs
//
// Catálogo fechado de permissões e cargos.
//
// `PermissionKey` é tipado (recurso + ação), nunca string livre em runtime:
// os slugs só entram pelo `FromStr`, que rejeita pares não registrados.
// As tabelas de cargo são declaradas como slugs e parseadas uma única vez
// na inicialização (`RoleCatalog::builtin`), que falha rápido se algum
// cargo referenciar uma chave inexistente.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// --- Recursos e ações ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Menu,
    Section,
    Item,
    Staff,
    Location,
    Brand,
}

impl Resource {
    pub const ALL: &'static [Resource] = &[
        Resource::Menu,
        Resource::Section,
        Resource::Item,
        Resource::Staff,
        Resource::Location,
        Resource::Brand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Menu => "menu",
            Resource::Section => "section",
            Resource::Item => "item",
            Resource::Staff => "staff",
            Resource::Location => "location",
            Resource::Brand => "brand",
        }
    }

    fn parse(s: &str) -> Option<Resource> {
        Resource::ALL.iter().copied().find(|r| r.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Publish,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Publish => "publish",
        }
    }

    fn parse(s: &str) -> Option<Action> {
        [
            Action::Read,
            Action::Create,
            Action::Update,
            Action::Delete,
            Action::Publish,
        ]
        .into_iter()
        .find(|a| a.as_str() == s)
    }
}

// --- Chave de permissão ---

/// Chave `recurso.acao` do catálogo fechado (ex.: `menu.read`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionKey {
    pub resource: Resource,
    pub action: Action,
}

impl PermissionKey {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Todo recurso registra o CRUD completo; `publish` existe só para menu.
    pub fn is_registered(&self) -> bool {
        match self.action {
            Action::Publish => self.resource == Resource::Menu,
            _ => true,
        }
    }

    /// Enumeração de todas as chaves registradas no catálogo.
    pub fn registry() -> Vec<PermissionKey> {
        let mut keys = Vec::new();
        for resource in Resource::ALL {
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                keys.push(PermissionKey::new(*resource, action));
            }
        }
        keys.push(PermissionKey::new(Resource::Menu, Action::Publish));
        keys
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource.as_str(), self.action.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown permission key '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for PermissionKey {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once('.')
            .ok_or_else(|| UnknownPermission(s.to_string()))?;
        let key = PermissionKey {
            resource: Resource::parse(resource).ok_or_else(|| UnknownPermission(s.to_string()))?,
            action: Action::parse(action).ok_or_else(|| UnknownPermission(s.to_string()))?,
        };
        if !key.is_registered() {
            return Err(UnknownPermission(s.to_string()));
        }
        Ok(key)
    }
}

// Na API a chave trafega como string ("menu.read").
impl Serialize for PermissionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PermissionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// --- Cargos ---

/// Slugs dos cargos embutidos.
pub mod roles {
    pub const OWNER: &str = "owner";
    pub const MANAGER: &str = "manager";
    pub const MENU_EDITOR: &str = "menu_editor";
    pub const FOH_STAFF: &str = "foh_staff";
    pub const KITCHEN_STAFF: &str = "kitchen_staff";
}

#[derive(Debug, Clone)]
pub struct RoleDef {
    pub slug: String,
    /// Nível explícito na hierarquia (maior = mais privilegiado).
    pub level: i32,
    /// O dono curto-circuita toda checagem de permissão (caso especial
    /// documentado no Policy Engine, não dobrado no conjunto genérico).
    pub superuser: bool,
    pub permissions: HashSet<PermissionKey>,
}

struct BuiltinRole {
    slug: &'static str,
    level: i32,
    superuser: bool,
    keys: &'static [&'static str],
}

const MANAGER_KEYS: &[&str] = &[
    "menu.read",
    "menu.create",
    "menu.update",
    "menu.delete",
    "menu.publish",
    "section.read",
    "section.create",
    "section.update",
    "section.delete",
    "item.read",
    "item.create",
    "item.update",
    "item.delete",
    "staff.read",
    "staff.create",
    "staff.update",
    "location.read",
    "location.create",
    "location.update",
    "brand.read",
    "brand.update",
];

const MENU_EDITOR_KEYS: &[&str] = &[
    "menu.read",
    "menu.create",
    "menu.update",
    "section.read",
    "section.create",
    "section.update",
    "item.read",
    "item.create",
    "item.update",
    "location.read",
    "brand.read",
];

const FOH_STAFF_KEYS: &[&str] = &[
    "menu.read",
    "section.read",
    "item.read",
    "location.read",
    "brand.read",
];

const KITCHEN_STAFF_KEYS: &[&str] = &["menu.read", "section.read", "item.read"];

const BUILTIN_ROLES: &[BuiltinRole] = &[
    BuiltinRole { slug: roles::OWNER, level: 100, superuser: true, keys: &[] },
    BuiltinRole { slug: roles::MANAGER, level: 80, superuser: false, keys: MANAGER_KEYS },
    BuiltinRole { slug: roles::MENU_EDITOR, level: 60, superuser: false, keys: MENU_EDITOR_KEYS },
    BuiltinRole { slug: roles::FOH_STAFF, level: 40, superuser: false, keys: FOH_STAFF_KEYS },
    BuiltinRole { slug: roles::KITCHEN_STAFF, level: 20, superuser: false, keys: KITCHEN_STAFF_KEYS },
];

/// Catálogo cargo -> (nível, conjunto de permissões).
///
/// Consultas com cargo desconhecido nunca dão pânico: devolvem o conjunto
/// vazio / nível -1 (falha fechada).
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    roles: HashMap<String, RoleDef>,
}

impl RoleCatalog {
    /// Monta o catálogo embutido validando as tabelas de cargo contra o
    /// registro de chaves. Um slug não registrado aborta a inicialização.
    pub fn builtin() -> anyhow::Result<Self> {
        let mut roles = HashMap::new();
        for builtin in BUILTIN_ROLES {
            let mut permissions = HashSet::new();
            if builtin.superuser {
                // O superusuário lista tudo (útil para telas de admin),
                // mesmo que o bypass nem consulte o conjunto.
                permissions.extend(PermissionKey::registry());
            }
            for slug in builtin.keys {
                let key: PermissionKey = slug.parse().map_err(|e| {
                    anyhow::anyhow!("cargo '{}' referencia chave inválida: {e}", builtin.slug)
                })?;
                permissions.insert(key);
            }
            roles.insert(
                builtin.slug.to_string(),
                RoleDef {
                    slug: builtin.slug.to_string(),
                    level: builtin.level,
                    superuser: builtin.superuser,
                    permissions,
                },
            );
        }
        Ok(Self { roles })
    }

    pub fn role(&self, slug: &str) -> Option<&RoleDef> {
        self.roles.get(slug)
    }

    /// Cargos ordenados por nível decrescente (para telas de admin).
    pub fn roles(&self) -> Vec<&RoleDef> {
        let mut defs: Vec<&RoleDef> = self.roles.values().collect();
        defs.sort_by(|a, b| b.level.cmp(&a.level));
        defs
    }

    /// Conjunto padrão do cargo; desconhecido -> vazio, nunca erro.
    pub fn permissions_for_role(&self, slug: &str) -> HashSet<PermissionKey> {
        self.roles
            .get(slug)
            .map(|r| r.permissions.clone())
            .unwrap_or_default()
    }

    /// Nível do cargo; desconhecido -> -1 (abaixo de todos os conhecidos).
    pub fn role_level(&self, slug: &str) -> i32 {
        self.roles.get(slug).map(|r| r.level).unwrap_or(-1)
    }

    /// Comparação estrita: nível igual NÃO é "maior".
    pub fn is_role_higher_than(&self, a: &str, b: &str) -> bool {
        self.role_level(a) > self.role_level(b)
    }

    pub fn is_superuser(&self, slug: &str) -> bool {
        self.roles.get(slug).map(|r| r.superuser).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RoleCatalog {
        RoleCatalog::builtin().expect("catálogo embutido deve validar")
    }

    #[test]
    fn hierarchy_is_strict() {
        let catalog = catalog();
        for def in catalog.roles() {
            assert!(
                !catalog.is_role_higher_than(&def.slug, &def.slug),
                "cargo '{}' não pode ser maior que ele mesmo",
                def.slug
            );
        }
        assert!(catalog.is_role_higher_than(roles::OWNER, roles::MANAGER));
        assert!(!catalog.is_role_higher_than(roles::MANAGER, roles::OWNER));
    }

    #[test]
    fn unknown_role_fails_closed() {
        let catalog = catalog();
        assert!(catalog.permissions_for_role("nonexistent").is_empty());
        assert_eq!(catalog.role_level("nonexistent"), -1);
        assert!(!catalog.is_superuser("nonexistent"));
        // Um cargo desconhecido fica abaixo de qualquer cargo conhecido.
        assert!(catalog.is_role_higher_than(roles::KITCHEN_STAFF, "nonexistent"));
        assert!(!catalog.is_role_higher_than("nonexistent", roles::KITCHEN_STAFF));
    }

    #[test]
    fn permission_key_round_trip() {
        let key: PermissionKey = "menu.publish".parse().unwrap();
        assert_eq!(key, PermissionKey::new(Resource::Menu, Action::Publish));
        assert_eq!(key.to_string(), "menu.publish");
    }

    #[test]
    fn unregistered_pairs_are_rejected() {
        assert!("staff.publish".parse::<PermissionKey>().is_err());
        assert!("menu.fly".parse::<PermissionKey>().is_err());
        assert!("drones.read".parse::<PermissionKey>().is_err());
        assert!("menuread".parse::<PermissionKey>().is_err());
    }

    #[test]
    fn menu_editor_defaults_match_catalog() {
        let catalog = catalog();
        let perms = catalog.permissions_for_role(roles::MENU_EDITOR);
        assert!(perms.contains(&"menu.update".parse().unwrap()));
        assert!(!perms.contains(&"menu.delete".parse().unwrap()));
        assert!(!perms.contains(&"staff.read".parse().unwrap()));
    }
}
