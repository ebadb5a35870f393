// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,

        // --- Menus ---
        handlers::menus::create_menu,
        handlers::menus::list_menus,
        handlers::menus::get_menu,
        handlers::menus::publish_menu,
        handlers::menus::unpublish_menu,
        handlers::menus::archive_menu,
        handlers::menus::menu_tree,
        handlers::menus::create_section,
        handlers::menus::create_item,
        handlers::menus::set_item_visibility,
        handlers::menus::add_line,
        handlers::menus::update_line,
        handlers::menus::delete_line,

        // --- Publications ---
        handlers::publications::activate,
        handlers::publications::activate_many,
        handlers::publications::deactivate,
        handlers::publications::list_current,

        // --- Staff ---
        handlers::staff::create_staff,
        handlers::staff::list_staff,
        handlers::staff::update_staff_access,
        handlers::staff::delete_staff,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::list_roles,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::StaffUser,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            handlers::auth::MeResponse,

            // --- Menus ---
            models::menu::MenuStatus,
            models::menu::LineType,
            models::menu::Menu,
            models::menu::Section,
            models::menu::Item,
            models::menu::MenuLine,
            models::menu::MenuTree,
            models::menu::MenuTreeSection,
            models::menu::MenuTreeItem,

            // --- Publications ---
            models::publication::MenuPublication,
            models::publication::ActivationOutcome,

            // --- Payloads ---
            handlers::menus::CreateMenuPayload,
            handlers::menus::CreateSectionPayload,
            handlers::menus::CreateItemPayload,
            handlers::menus::SetVisibilityPayload,
            handlers::menus::AddLinePayload,
            handlers::menus::UpdateLinePayload,
            handlers::publications::ActivatePayload,
            handlers::publications::ActivateManyPayload,
            handlers::staff::CreateStaffPayload,
            handlers::staff::UpdateAccessPayload,

            // --- RBAC ---
            handlers::rbac::RoleView,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Perfil"),
        (name = "Menus", description = "Cardápios, Seções, Itens e a Árvore de Linhas"),
        (name = "Publications", description = "Ativação de Cardápios por Localidade"),
        (name = "Staff", description = "Gestão de Equipe"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
