//src/main.rs

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

use cardapio_backend::config::AppState;
use cardapio_backend::docs::ApiDoc;
use cardapio_backend::handlers;
use cardapio_backend::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    let app_state = AppState::new().await;

    // Roda as migrações do SQLx na inicialização.
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: login e a vitrine (árvore publicada).
    let public_routes = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/menus/{menu_id}/tree", get(handlers::menus::menu_tree));

    let menu_routes = Router::new()
        .route(
            "/menus",
            post(handlers::menus::create_menu).get(handlers::menus::list_menus),
        )
        .route("/menus/{menu_id}", get(handlers::menus::get_menu))
        .route("/menus/{menu_id}/publish", post(handlers::menus::publish_menu))
        .route("/menus/{menu_id}/unpublish", post(handlers::menus::unpublish_menu))
        .route("/menus/{menu_id}/archive", post(handlers::menus::archive_menu))
        .route("/menus/{menu_id}/lines", post(handlers::menus::add_line))
        .route(
            "/lines/{line_id}",
            patch(handlers::menus::update_line).delete(handlers::menus::delete_line),
        )
        .route("/sections", post(handlers::menus::create_section))
        .route("/items", post(handlers::menus::create_item))
        .route(
            "/items/{item_id}/visibility",
            patch(handlers::menus::set_item_visibility),
        );

    let publication_routes = Router::new()
        .route(
            "/locations/{location_id}/publications",
            post(handlers::publications::activate).get(handlers::publications::list_current),
        )
        .route(
            "/locations/{location_id}/publications/batch",
            post(handlers::publications::activate_many),
        )
        .route(
            "/publications/{publication_id}",
            axum::routing::delete(handlers::publications::deactivate),
        );

    let staff_routes = Router::new()
        .route(
            "/staff",
            post(handlers::staff::create_staff).get(handlers::staff::list_staff),
        )
        .route(
            "/staff/{user_id}/access",
            put(handlers::staff::update_staff_access),
        )
        .route(
            "/staff/{user_id}",
            axum::routing::delete(handlers::staff::delete_staff),
        );

    let rbac_routes = Router::new()
        .route("/rbac/permissions", get(handlers::rbac::list_permissions))
        .route("/rbac/roles", get(handlers::rbac::list_roles));

    // Tudo que não é público passa pelo middleware de autenticação; a
    // autorização em si acontece nos extractors de cada handler.
    let protected_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .merge(menu_routes)
        .merge(publication_routes)
        .merge(staff_routes)
        .merge(rbac_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .nest("/api", public_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
