// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::db::{
    MenuRepository, MenuStore, PrincipalStore, PublicationRepository, PublicationStore,
    UserRepository,
};
use crate::rbac::catalog::RoleCatalog;
use crate::rbac::guard::AuthGuard;
use crate::services::{
    auth::AuthService, menu_service::MenuService, publication_service::PublicationService,
    staff_service::StaffService,
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog: Arc<RoleCatalog>,
    pub guard: Arc<AuthGuard>,
    pub auth_service: AuthService,
    pub menu_service: MenuService,
    pub publication_service: PublicationService,
    pub staff_service: StaffService,
}

impl AppState {
    // Carrega as configurações, conecta no banco e monta os serviços.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        tracing_subscriber::fmt().with_target(false).compact().init();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                pool
            }
            Err(e) => {
                tracing::error!("🔥 Falha ao conectar ao banco de dados: {:?}", e);
                std::process::exit(1);
            }
        };

        // Falha na subida, nunca em requisição: catálogo inválido é bug
        // de programação, não condição de runtime.
        let catalog = match RoleCatalog::builtin() {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                tracing::error!("🔥 Catálogo de permissões inválido: {:?}", e);
                std::process::exit(1);
            }
        };

        let users: Arc<dyn PrincipalStore> = Arc::new(UserRepository::new(db_pool.clone()));
        let menus: Arc<dyn MenuStore> = Arc::new(MenuRepository::new(db_pool.clone()));
        let publications: Arc<dyn PublicationStore> =
            Arc::new(PublicationRepository::new(db_pool.clone()));

        let guard = Arc::new(AuthGuard::new(catalog.clone(), users.clone()));

        Self {
            db_pool,
            catalog: catalog.clone(),
            guard,
            auth_service: AuthService::new(users.clone(), jwt_secret),
            menu_service: MenuService::new(menus.clone()),
            publication_service: PublicationService::new(publications, menus),
            staff_service: StaffService::new(users, catalog),
        }
    }
}
