// tests/menu_tree_flow.rs
//
// A árvore de linhas de ponta a ponta: posicionamento, deleção com
// promoção de filhos, desempate de ordenação, cascata de visibilidade
// e renderização publicada.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use cardapio_backend::common::error::AppError;
use cardapio_backend::db::{MemoryStore, MenuStore};
use cardapio_backend::models::menu::{Item, LineType, Menu, MenuStatus, Section};
use cardapio_backend::services::menu_service::{LineUpdate, MenuService, NewLine};

fn texts(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

struct Fixture {
    store: Arc<MemoryStore>,
    service: MenuService,
    tenant: Uuid,
    menu: Menu,
    section: Section,
    item: Item,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let service = MenuService::new(store.clone());
    let tenant = Uuid::new_v4();

    let menu = service
        .create_menu(tenant, Uuid::new_v4(), "almoco", "Almoço")
        .await
        .unwrap();
    let section = service
        .create_section(tenant, texts(&[("pt", "Entradas"), ("en", "Starters")]), None)
        .await
        .unwrap();
    let item = service
        .create_item(
            tenant,
            section.id,
            "BURG-001",
            4590,
            "BRL",
            texts(&[("pt", "Hambúrguer"), ("en", "Burger")]),
            None,
            vec![],
        )
        .await
        .unwrap();

    Fixture {
        store,
        service,
        tenant,
        menu,
        section,
        item,
    }
}

fn section_line(section_id: Uuid, parent: Option<Uuid>) -> NewLine {
    NewLine {
        line_type: LineType::Section,
        section_id: Some(section_id),
        item_id: None,
        parent_line_id: parent,
        display_order: None,
    }
}

fn item_line(item_id: Uuid, parent: Option<Uuid>) -> NewLine {
    NewLine {
        line_type: LineType::Item,
        section_id: None,
        item_id: Some(item_id),
        parent_line_id: parent,
        display_order: None,
    }
}

#[tokio::test]
async fn item_lines_require_a_section_parent() {
    let f = fixture().await;

    // Item no topo é rejeitado.
    let err = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Item sob outra linha de item também.
    let s = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let i = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(s.id)))
        .await
        .unwrap();
    let err = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(i.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn appended_lines_get_sequential_display_order() {
    let f = fixture().await;
    let a = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let b = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();

    assert_eq!(a.display_order, 0);
    assert_eq!(b.display_order, 1);
}

#[tokio::test]
async fn deleting_a_section_promotes_children_and_compacts_siblings() {
    let f = fixture().await;

    // Topo: [antes, pai, depois]; o pai tem uma subseção como filho.
    let before = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let parent = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let after = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let child = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, Some(parent.id)))
        .await
        .unwrap();

    f.service.delete_line(f.tenant, parent.id).await.unwrap();

    let lines = f.store.list_lines(f.tenant, f.menu.id).await.unwrap();

    // O filho assume a POSIÇÃO do pai deletado, entre os irmãos antigos.
    let find = |id: Uuid| lines.iter().find(|l| l.id == id).unwrap();
    let promoted = find(child.id);
    assert_eq!(promoted.parent_line_id, None);
    assert_eq!(promoted.display_order, 1);
    assert_eq!(find(before.id).display_order, 0);
    assert_eq!(find(after.id).display_order, 2);
    assert!(lines.iter().all(|l| l.id != parent.id));
}

#[tokio::test]
async fn equal_display_order_breaks_ties_by_creation_order() {
    let f = fixture().await;
    let first = f
        .service
        .add_line(
            f.tenant,
            f.menu.id,
            NewLine {
                display_order: Some(5),
                ..section_line(f.section.id, None)
            },
        )
        .await
        .unwrap();
    let second = f
        .service
        .add_line(
            f.tenant,
            f.menu.id,
            NewLine {
                display_order: Some(5),
                ..section_line(f.section.id, None)
            },
        )
        .await
        .unwrap();

    f.service.publish_menu(f.tenant, f.menu.id).await.unwrap();
    let tree = f.service.menu_tree(f.tenant, f.menu.id, "pt").await.unwrap();

    let order: Vec<Uuid> = tree.sections.iter().map(|s| s.line_id).collect();
    assert_eq!(order, vec![first.id, second.id]);
}

#[tokio::test]
async fn reparent_appends_to_destination_and_compacts_source() {
    let f = fixture().await;
    let target = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let moved = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let tail = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();

    f.service
        .update_line(
            f.tenant,
            moved.id,
            LineUpdate {
                parent_line_id: Some(Some(target.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let lines = f.store.list_lines(f.tenant, f.menu.id).await.unwrap();
    let find = |id: Uuid| lines.iter().find(|l| l.id == id).unwrap();

    assert_eq!(find(moved.id).parent_line_id, Some(target.id));
    assert_eq!(find(moved.id).display_order, 0);
    // O grupo de origem recompacta: [target=0, tail=1].
    assert_eq!(find(target.id).display_order, 0);
    assert_eq!(find(tail.id).display_order, 1);
}

#[tokio::test]
async fn a_section_cannot_become_its_own_descendant() {
    let f = fixture().await;
    let outer = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let inner = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, Some(outer.id)))
        .await
        .unwrap();

    let err = f
        .service
        .update_line(
            f.tenant,
            outer.id,
            LineUpdate {
                parent_line_id: Some(Some(inner.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn item_visibility_cascades_to_every_referencing_line() {
    let f = fixture().await;
    let menu2 = f
        .service
        .create_menu(f.tenant, Uuid::new_v4(), "jantar", "Jantar")
        .await
        .unwrap();

    let s1 = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let s2 = f
        .service
        .add_line(f.tenant, menu2.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let l1 = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(s1.id)))
        .await
        .unwrap();
    let l2 = f
        .service
        .add_line(f.tenant, menu2.id, item_line(f.item.id, Some(s2.id)))
        .await
        .unwrap();

    let item = f
        .service
        .set_item_visibility(f.tenant, f.item.id, false)
        .await
        .unwrap();
    assert!(!item.is_visible);

    for (menu_id, line_id) in [(f.menu.id, l1.id), (menu2.id, l2.id)] {
        let lines = f.store.list_lines(f.tenant, menu_id).await.unwrap();
        assert!(!lines.iter().find(|l| l.id == line_id).unwrap().is_enabled);
    }

    // Linhas novas do item nascem desabilitadas enquanto ele está oculto.
    let born_hidden = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(s1.id)))
        .await
        .unwrap();
    assert!(!born_hidden.is_enabled);
}

#[tokio::test]
async fn failed_visibility_batch_leaves_state_untouched() {
    let f = fixture().await;
    let s = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    let l = f
        .service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(s.id)))
        .await
        .unwrap();

    f.store.fail_next_batch();
    let err = f
        .service
        .set_item_visibility(f.tenant, f.item.id, false)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    // Nem o item nem a linha mudaram: tudo-ou-nada.
    let item = f.store.find_item(f.tenant, f.item.id).await.unwrap().unwrap();
    assert!(item.is_visible);
    let lines = f.store.list_lines(f.tenant, f.menu.id).await.unwrap();
    assert!(lines.iter().find(|x| x.id == l.id).unwrap().is_enabled);
}

#[tokio::test]
async fn published_tree_resolves_locale_with_fallback() {
    let f = fixture().await;
    let s = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();
    f.service
        .add_line(f.tenant, f.menu.id, item_line(f.item.id, Some(s.id)))
        .await
        .unwrap();

    // Rascunho não renderiza.
    let err = f.service.menu_tree(f.tenant, f.menu.id, "pt").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    f.service.publish_menu(f.tenant, f.menu.id).await.unwrap();

    let tree = f.service.menu_tree(f.tenant, f.menu.id, "en").await.unwrap();
    assert_eq!(tree.sections[0].title, "Starters");
    assert_eq!(tree.sections[0].items[0].name, "Burger");

    // Locale sem tradução cai no "en".
    let tree = f.service.menu_tree(f.tenant, f.menu.id, "fr").await.unwrap();
    assert_eq!(tree.sections[0].title, "Starters");
}

#[tokio::test]
async fn status_machine_is_enforced() {
    let f = fixture().await;

    // Draft -> Archived é permitido e terminal.
    f.service.archive_menu(f.tenant, f.menu.id).await.unwrap();
    let err = f.service.publish_menu(f.tenant, f.menu.id).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::InvalidTransition {
            from: MenuStatus::Archived,
            to: MenuStatus::Published
        }
    ));

    // Arquivado também não aceita edição de linhas.
    let err = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn archived_menus_reject_line_deletion_too() {
    let f = fixture().await;
    let s = f
        .service
        .add_line(f.tenant, f.menu.id, section_line(f.section.id, None))
        .await
        .unwrap();

    f.service.archive_menu(f.tenant, f.menu.id).await.unwrap();

    // Deletar linha é edição como qualquer outra: bloqueada no terminal.
    let err = f.service.delete_line(f.tenant, s.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let lines = f.store.list_lines(f.tenant, f.menu.id).await.unwrap();
    assert!(lines.iter().any(|l| l.id == s.id));
}

#[tokio::test]
async fn menu_codes_are_unique_per_tenant() {
    let f = fixture().await;

    let err = f
        .service
        .create_menu(f.tenant, Uuid::new_v4(), "almoco", "Almoço de novo")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Outro tenant pode reutilizar o mesmo código.
    f.service
        .create_menu(Uuid::new_v4(), Uuid::new_v4(), "almoco", "Almoço")
        .await
        .unwrap();
}
