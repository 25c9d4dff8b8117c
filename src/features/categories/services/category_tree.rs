//! Sibling ordering and tree assembly.
//!
//! Pure functions shared by the service and every [`CategoryRepository`]
//! implementation, so the Postgres store and the in-memory store order
//! siblings identically.
//!
//! [`CategoryRepository`]: crate::features::categories::repositories::CategoryRepository

use std::collections::HashMap;

use uuid::Uuid;

use crate::features::categories::models::{CategoryTreeNode, TranslatedCategory};

/// Position of the first child under any parent.
pub const FIRST_POSITION: i32 = 0;

/// Next free position after the current maximum among a parent's children.
pub fn next_position_after(max_position: Option<i32>) -> i32 {
    max_position.map_or(FIRST_POSITION, |max| max + 1)
}

/// Clamp a requested index into `0..=upper`.
pub fn clamp_index(index: i64, upper: usize) -> usize {
    index.clamp(0, upper as i64) as usize
}

/// Final parent and position of one row after a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub position: i32,
}

/// Rows to rewrite for a move; empty when the move changes nothing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovePlan {
    pub placements: Vec<Placement>,
}

impl MovePlan {
    pub fn is_noop(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn position_of(&self, id: Uuid) -> Option<i32> {
        self.placements
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.position)
    }
}

/// Compute the placements for moving `target_id` under `new_parent_id`.
///
/// `new_siblings` are the current children of the new parent and
/// `old_siblings` the children of the current parent, both ordered by
/// position. Every child of an affected parent is renumbered from
/// [`FIRST_POSITION`]; a same-parent move to the slot the target already
/// occupies yields an empty plan.
pub fn plan_move(
    target_id: Uuid,
    current_parent_id: Option<Uuid>,
    new_parent_id: Uuid,
    new_siblings: &[Uuid],
    old_siblings: &[Uuid],
    index: i64,
) -> MovePlan {
    let same_parent = current_parent_id == Some(new_parent_id);
    let current_index = new_siblings.iter().position(|id| *id == target_id);

    if same_parent {
        if let Some(current_index) = current_index {
            let mut ordered = new_siblings.to_vec();
            let new_index = clamp_index(index, ordered.len() - 1);
            if new_index == current_index {
                return MovePlan::default();
            }
            let moved = ordered.remove(current_index);
            ordered.insert(new_index, moved);
            return MovePlan {
                placements: renumber(&ordered, new_parent_id),
            };
        }
    }

    let mut ordered: Vec<Uuid> = new_siblings
        .iter()
        .copied()
        .filter(|id| *id != target_id)
        .collect();
    let new_index = clamp_index(index, ordered.len());
    ordered.insert(new_index, target_id);
    let mut placements = renumber(&ordered, new_parent_id);

    if let Some(old_parent_id) = current_parent_id.filter(|_| !same_parent) {
        let remaining: Vec<Uuid> = old_siblings
            .iter()
            .copied()
            .filter(|id| *id != target_id)
            .collect();
        placements.extend(renumber(&remaining, old_parent_id));
    }

    MovePlan { placements }
}

fn renumber(ordered: &[Uuid], parent_id: Uuid) -> Vec<Placement> {
    ordered
        .iter()
        .enumerate()
        .map(|(index, id)| Placement {
            id: *id,
            parent_id,
            position: FIRST_POSITION + index as i32,
        })
        .collect()
}

/// Nest `descendants` under `root` by parent id, children ordered by position.
///
/// Rows whose parent is not part of the subtree are ignored.
pub fn build_tree(root: TranslatedCategory, descendants: Vec<TranslatedCategory>) -> CategoryTreeNode {
    let mut by_parent: HashMap<Uuid, Vec<TranslatedCategory>> = HashMap::new();
    for category in descendants {
        if let Some(parent_id) = category.parent_id {
            by_parent.entry(parent_id).or_default().push(category);
        }
    }
    for children in by_parent.values_mut() {
        children.sort_by_key(|c| (c.position, c.id));
    }

    build_node(root, &mut by_parent)
}

fn build_node(
    category: TranslatedCategory,
    by_parent: &mut HashMap<Uuid, Vec<TranslatedCategory>>,
) -> CategoryTreeNode {
    let children = by_parent
        .remove(&category.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| build_node(child, by_parent))
        .collect();

    CategoryTreeNode { category, children }
}
