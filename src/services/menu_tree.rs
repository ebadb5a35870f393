// src/services/menu_tree.rs
//
// Planejamento puro das mutações da árvore de linhas. Nenhum I/O:
// recebe o snapshot das linhas de UM cardápio (em ordem de criação) e
// devolve o `LineBatch` que o store aplica numa transação.
//
// Invariantes garantidas aqui:
// - linha de item sempre pendurada numa linha de seção do mesmo cardápio;
// - sem auto-parentesco e sem ciclos;
// - deleção de seção promove os filhos ao pai dela (nunca apaga itens);
// - `display_order` dos irmãos volta a ser 0..n-1 contíguo após deleção,
//   com desempate estável pela ordem de criação.

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::LineBatch;
use crate::models::menu::{LineType, MenuLine};

/// Filhos diretos de `parent`, em ordem de exibição. O sort é estável e
/// a entrada vem em ordem de criação, então empates de `display_order`
/// preservam a ordem de inserção (nunca reordenam por nome ou id).
pub fn ordered_children(lines: &[MenuLine], parent: Option<Uuid>) -> Vec<&MenuLine> {
    let mut children: Vec<&MenuLine> = lines
        .iter()
        .filter(|l| l.parent_line_id == parent)
        .collect();
    children.sort_by_key(|l| l.display_order);
    children
}

/// Próximo rank livre ao final do grupo de irmãos.
pub fn next_display_order(lines: &[MenuLine], parent: Option<Uuid>) -> i32 {
    ordered_children(lines, parent)
        .last()
        .map(|l| l.display_order + 1)
        .unwrap_or(0)
}

/// Valida o posicionamento de uma linha (criação ou re-parent).
/// `line_id` é `Some` quando a linha já existe (update).
pub fn validate_placement(
    lines: &[MenuLine],
    line_type: LineType,
    parent_line_id: Option<Uuid>,
    line_id: Option<Uuid>,
) -> Result<(), AppError> {
    let parent = match parent_line_id {
        None => {
            if line_type == LineType::Item {
                return Err(AppError::Validation(
                    "An item line requires a parent section line".into(),
                ));
            }
            return Ok(());
        }
        Some(parent_id) => {
            if line_id == Some(parent_id) {
                return Err(AppError::Validation("A line cannot be its own parent".into()));
            }
            // `lines` contém só as linhas deste cardápio: pai de outro
            // cardápio cai aqui também.
            lines
                .iter()
                .find(|l| l.id == parent_id)
                .ok_or_else(|| {
                    AppError::Validation("Parent line not found in this menu".into())
                })?
        }
    };

    if parent.line_type != LineType::Section {
        return Err(AppError::Validation(
            "Parent line must be a section line".into(),
        ));
    }

    // Sem ciclos: o novo pai não pode ser descendente da própria linha.
    if let Some(line_id) = line_id {
        let mut cursor = Some(parent.id);
        let mut hops = 0usize;
        while let Some(current) = cursor {
            if current == line_id {
                return Err(AppError::Validation(
                    "A line cannot be moved under its own descendant".into(),
                ));
            }
            hops += 1;
            if hops > lines.len() {
                return Err(AppError::Validation("Menu line tree contains a cycle".into()));
            }
            cursor = lines
                .iter()
                .find(|l| l.id == current)
                .and_then(|l| l.parent_line_id);
        }
    }

    Ok(())
}

/// Planeja a deleção: os filhos da linha removida sobem para o pai dela,
/// ocupando a posição que ela tinha; o grupo inteiro é recompactado.
pub fn plan_delete(lines: &[MenuLine], line: &MenuLine) -> LineBatch {
    let mut batch = LineBatch::default();
    batch.delete.push(line.id);

    let siblings = ordered_children(lines, line.parent_line_id);
    let children = ordered_children(lines, Some(line.id));

    let mut order = 0;
    for sibling in siblings {
        if sibling.id == line.id {
            // Promoção: filhos entram no lugar do pai removido,
            // preservando a ordem relativa entre eles.
            for child in &children {
                batch.reparent.push((child.id, line.parent_line_id));
                batch.reorder.push((child.id, order));
                order += 1;
            }
        } else {
            if sibling.display_order != order {
                batch.reorder.push((sibling.id, order));
            }
            order += 1;
        }
    }

    batch
}

/// Planeja a troca de pai: valida, anexa ao final do grupo destino e
/// recompacta o grupo de origem.
pub fn plan_reparent(
    lines: &[MenuLine],
    line: &MenuLine,
    new_parent: Option<Uuid>,
) -> Result<LineBatch, AppError> {
    validate_placement(lines, line.line_type, new_parent, Some(line.id))?;

    let mut batch = LineBatch::default();
    batch.reparent.push((line.id, new_parent));

    // Append de verdade: o rank novo vem DEPOIS do último irmão do
    // destino, não do tamanho do grupo (os ranks podem ter buracos).
    let destination: Vec<&MenuLine> = ordered_children(lines, new_parent)
        .into_iter()
        .filter(|l| l.id != line.id)
        .collect();
    let appended_order = destination
        .last()
        .map(|l| l.display_order + 1)
        .unwrap_or(0);
    batch.reorder.push((line.id, appended_order));

    let mut order = 0;
    for sibling in ordered_children(lines, line.parent_line_id) {
        if sibling.id == line.id {
            continue;
        }
        if sibling.display_order != order {
            batch.reorder.push((sibling.id, order));
        }
        order += 1;
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(
        menu_id: Uuid,
        line_type: LineType,
        parent: Option<Uuid>,
        display_order: i32,
    ) -> MenuLine {
        MenuLine {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            menu_id,
            line_type,
            section_id: (line_type == LineType::Section).then(Uuid::new_v4),
            item_id: (line_type == LineType::Item).then(Uuid::new_v4),
            parent_line_id: parent,
            display_order,
            is_enabled: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn item_requires_a_section_parent() {
        let menu = Uuid::new_v4();
        let section = line(menu, LineType::Section, None, 0);
        let item = line(menu, LineType::Item, Some(section.id), 0);
        let lines = vec![section.clone(), item.clone()];

        // sem pai
        assert!(validate_placement(&lines, LineType::Item, None, None).is_err());
        // pai é linha de item
        assert!(validate_placement(&lines, LineType::Item, Some(item.id), None).is_err());
        // pai inexistente (inclui pai de outro cardápio)
        assert!(validate_placement(&lines, LineType::Item, Some(Uuid::new_v4()), None).is_err());
        // pai de seção válido
        assert!(validate_placement(&lines, LineType::Item, Some(section.id), None).is_ok());
    }

    #[test]
    fn self_parent_and_cycles_are_rejected() {
        let menu = Uuid::new_v4();
        let a = line(menu, LineType::Section, None, 0);
        let b = line(menu, LineType::Section, Some(a.id), 0);
        let lines = vec![a.clone(), b.clone()];

        assert!(validate_placement(&lines, LineType::Section, Some(a.id), Some(a.id)).is_err());
        // mover A para baixo do próprio filho B
        assert!(plan_reparent(&lines, &a, Some(b.id)).is_err());
    }

    #[test]
    fn deleting_a_section_promotes_children() {
        let menu = Uuid::new_v4();
        let parent = line(menu, LineType::Section, None, 0);
        let s = line(menu, LineType::Section, Some(parent.id), 0);
        let i1 = line(menu, LineType::Item, Some(s.id), 0);
        let i2 = line(menu, LineType::Item, Some(s.id), 1);
        let lines = vec![parent.clone(), s.clone(), i1.clone(), i2.clone()];

        let batch = plan_delete(&lines, &s);

        // só a seção some; os itens nunca são deletados em cascata
        assert_eq!(batch.delete, vec![s.id]);
        assert!(batch.reparent.contains(&(i1.id, Some(parent.id))));
        assert!(batch.reparent.contains(&(i2.id, Some(parent.id))));
        // os promovidos ocupam a posição da seção removida, em ordem
        assert!(batch.reorder.contains(&(i1.id, 0)));
        assert!(batch.reorder.contains(&(i2.id, 1)));
    }

    #[test]
    fn sibling_orders_compact_after_delete() {
        let menu = Uuid::new_v4();
        let parent = line(menu, LineType::Section, None, 0);
        let items: Vec<MenuLine> = (0..4)
            .map(|n| line(menu, LineType::Item, Some(parent.id), n))
            .collect();
        let mut lines = vec![parent.clone()];
        lines.extend(items.iter().cloned());

        let batch = plan_delete(&lines, &items[1]);

        assert_eq!(batch.delete, vec![items[1].id]);
        // [0,1,2,3] - posição 1 => [0,1,2] preservando a sequência
        assert!(!batch.reorder.iter().any(|(id, _)| *id == items[0].id));
        assert!(batch.reorder.contains(&(items[2].id, 1)));
        assert!(batch.reorder.contains(&(items[3].id, 2)));
    }

    #[test]
    fn display_order_ties_break_by_creation_order() {
        let menu = Uuid::new_v4();
        let parent = line(menu, LineType::Section, None, 0);
        let first = line(menu, LineType::Item, Some(parent.id), 5);
        let second = line(menu, LineType::Item, Some(parent.id), 5);
        let lines = vec![parent.clone(), first.clone(), second.clone()];

        let ordered = ordered_children(&lines, Some(parent.id));
        assert_eq!(ordered[0].id, first.id);
        assert_eq!(ordered[1].id, second.id);
    }

    #[test]
    fn next_order_appends_after_last_sibling() {
        let menu = Uuid::new_v4();
        let parent = line(menu, LineType::Section, None, 0);
        let i = line(menu, LineType::Item, Some(parent.id), 7);
        let lines = vec![parent.clone(), i];
        assert_eq!(next_display_order(&lines, Some(parent.id)), 8);
        assert_eq!(next_display_order(&lines, Some(Uuid::new_v4())), 0);
    }

    #[test]
    fn reparent_appends_to_destination_and_compacts_source() {
        let menu = Uuid::new_v4();
        let a = line(menu, LineType::Section, None, 0);
        let b = line(menu, LineType::Section, None, 1);
        let i1 = line(menu, LineType::Item, Some(a.id), 0);
        let i2 = line(menu, LineType::Item, Some(a.id), 1);
        let i3 = line(menu, LineType::Item, Some(b.id), 0);
        let lines = vec![a.clone(), b.clone(), i1.clone(), i2.clone(), i3.clone()];

        let batch = plan_reparent(&lines, &i1, Some(b.id)).unwrap();

        assert!(batch.reparent.contains(&(i1.id, Some(b.id))));
        // entra depois de i3 no destino
        assert!(batch.reorder.contains(&(i1.id, 1)));
        // i2 volta para o rank 0 na origem
        assert!(batch.reorder.contains(&(i2.id, 0)));
    }

    #[test]
    fn reparent_appends_after_non_contiguous_destination_ranks() {
        let menu = Uuid::new_v4();
        let a = line(menu, LineType::Section, None, 0);
        let b = line(menu, LineType::Section, None, 1);
        // Ranks com buraco no destino: único filho em 5.
        let existing = line(menu, LineType::Item, Some(b.id), 5);
        let moved = line(menu, LineType::Item, Some(a.id), 0);
        let lines = vec![a.clone(), b.clone(), existing.clone(), moved.clone()];

        let batch = plan_reparent(&lines, &moved, Some(b.id)).unwrap();

        // Tem que ordenar DEPOIS do irmão existente, não no rank 1.
        assert!(batch.reorder.contains(&(moved.id, 6)));
    }
}
