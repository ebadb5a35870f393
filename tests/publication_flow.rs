// tests/publication_flow.rs
//
// Ativação por localidade: idempotência sob concorrência, coexistência
// de cardápios correntes, falha parcial no lote e desativação explícita.

use std::sync::Arc;

use uuid::Uuid;

use cardapio_backend::common::error::AppError;
use cardapio_backend::db::MemoryStore;
use cardapio_backend::models::menu::Menu;
use cardapio_backend::services::menu_service::MenuService;
use cardapio_backend::services::publication_service::PublicationService;

struct Fixture {
    service: PublicationService,
    menus: MenuService,
    tenant: Uuid,
    location: Uuid,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let menus = MenuService::new(store.clone());
    let service = PublicationService::new(store.clone(), store);
    Fixture {
        service,
        menus,
        tenant: Uuid::new_v4(),
        location: Uuid::new_v4(),
    }
}

impl Fixture {
    async fn published_menu(&self, code: &str) -> Menu {
        let menu = self
            .menus
            .create_menu(self.tenant, Uuid::new_v4(), code, code)
            .await
            .unwrap();
        self.menus.publish_menu(self.tenant, menu.id).await.unwrap()
    }
}

#[tokio::test]
async fn only_published_menus_can_be_activated() {
    let f = fixture().await;
    let draft = f
        .menus
        .create_menu(f.tenant, Uuid::new_v4(), "rascunho", "Rascunho")
        .await
        .unwrap();

    let err = f
        .service
        .activate(f.tenant, f.location, draft.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    f.menus.publish_menu(f.tenant, draft.id).await.unwrap();
    f.service
        .activate(f.tenant, f.location, draft.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_activation_converges_to_one_publication() {
    let f = fixture().await;
    let menu = f.published_menu("almoco").await;

    let service = f.service.clone();
    let (tenant, location, menu_id) = (f.tenant, f.location, menu.id);
    let a = tokio::spawn({
        let service = service.clone();
        async move { service.activate(tenant, location, menu_id).await }
    });
    let b = tokio::spawn(async move { service.activate(tenant, location, menu_id).await });

    let pa = a.await.unwrap().unwrap();
    let pb = b.await.unwrap().unwrap();

    // As duas chamadas enxergam o MESMO registro corrente.
    assert_eq!(pa.id, pb.id);
    assert!(pa.is_current && pb.is_current);

    let current = f
        .service
        .current_for_location(f.tenant, f.location)
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
}

#[tokio::test]
async fn multiple_menus_stay_current_at_the_same_location() {
    let f = fixture().await;
    let lunch = f.published_menu("almoco").await;
    let dinner = f.published_menu("jantar").await;

    f.service.activate(f.tenant, f.location, lunch.id).await.unwrap();
    f.service.activate(f.tenant, f.location, dinner.id).await.unwrap();

    let current = f
        .service
        .current_for_location(f.tenant, f.location)
        .await
        .unwrap();
    let menu_ids: Vec<Uuid> = current.iter().map(|p| p.menu_id).collect();
    assert_eq!(current.len(), 2);
    assert!(menu_ids.contains(&lunch.id) && menu_ids.contains(&dinner.id));
}

#[tokio::test]
async fn batch_activation_reports_partial_failures() {
    let f = fixture().await;
    let ok = f.published_menu("almoco").await;
    let draft = f
        .menus
        .create_menu(f.tenant, Uuid::new_v4(), "rascunho", "Rascunho")
        .await
        .unwrap();
    let missing = Uuid::new_v4();

    let outcomes = f
        .service
        .activate_many(f.tenant, f.location, &[ok.id, draft.id, missing])
        .await;

    assert_eq!(outcomes.len(), 3);

    let outcome_for = |id: Uuid| outcomes.iter().find(|o| o.menu_id == id).unwrap();
    assert!(outcome_for(ok.id).activated);
    assert!(outcome_for(ok.id).publication.is_some());
    assert!(!outcome_for(draft.id).activated);
    assert!(outcome_for(draft.id).error.is_some());
    assert!(!outcome_for(missing).activated);

    // O sucesso não é desfeito pelas falhas vizinhas.
    let current = f
        .service
        .current_for_location(f.tenant, f.location)
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].menu_id, ok.id);
}

#[tokio::test]
async fn deactivation_is_explicit_and_reactivation_reuses_the_record() {
    let f = fixture().await;
    let menu = f.published_menu("almoco").await;

    let publication = f.service.activate(f.tenant, f.location, menu.id).await.unwrap();

    // Despublicar o cardápio NÃO desativa a publicação por si só.
    f.menus.unpublish_menu(f.tenant, menu.id).await.unwrap();

    f.service.deactivate(f.tenant, publication.id).await.unwrap();
    let current = f
        .service
        .current_for_location(f.tenant, f.location)
        .await
        .unwrap();
    assert!(current.is_empty());

    // Reativar o mesmo par devolve o MESMO registro, corrente de novo.
    f.menus.publish_menu(f.tenant, menu.id).await.unwrap();
    let reactivated = f.service.activate(f.tenant, f.location, menu.id).await.unwrap();
    assert_eq!(reactivated.id, publication.id);
    assert!(reactivated.is_current);
}

#[tokio::test]
async fn archived_menus_drop_out_of_the_current_listing() {
    let f = fixture().await;
    let menu = f.published_menu("almoco").await;
    f.service.activate(f.tenant, f.location, menu.id).await.unwrap();

    f.menus.archive_menu(f.tenant, menu.id).await.unwrap();

    let current = f
        .service
        .current_for_location(f.tenant, f.location)
        .await
        .unwrap();
    assert!(current.is_empty());

    let err = f.service.activate(f.tenant, f.location, menu.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn deactivating_an_unknown_publication_is_not_found() {
    let f = fixture().await;
    let err = f
        .service
        .deactivate(f.tenant, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
}
