//! Manual display ordering for catalog entities.
//!
//! Admins order products (within a category, per subcategory) and
//! subcategories (within their category) by dragging them. This module holds
//! the framework-free part of that:
//!
//! - [`grouping`] partitions a category's items into independently orderable
//!   groups
//! - [`plan`] turns a drop gesture into a [`ReorderPlan`]: the new local list
//!   plus the batch of [`PositionUpdate`]s to persist
//! - [`reorder`] and [`normalize`] are the two primitive steps
//!
//! Positions are 1-based. After a reorder the affected group always holds the
//! contiguous sequence `1..=N`, whatever it held before.

pub mod grouping;
pub mod plan;

use std::hash::Hash;

use serde::Serialize;

pub use grouping::{ALL_PRODUCTS, Group, GroupKey, Grouping, UNASSIGNED, group_products, group_subcategories};
pub use plan::{DropEvent, MoveRejected, ReorderPlan};

use crate::types::{Product, Subcategory};

/// An entity with a manual display position.
pub trait Positioned {
    /// Identifier used in persistence requests.
    type Id: Clone + Eq + Hash + std::fmt::Debug + std::fmt::Display;

    fn id(&self) -> &Self::Id;
    fn position(&self) -> Option<u32>;
    fn set_position(&mut self, position: u32);
}

impl Positioned for Product {
    type Id = crate::types::ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn position(&self) -> Option<u32> {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = Some(position);
    }
}

impl Positioned for Subcategory {
    type Id = crate::types::SubcategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn position(&self) -> Option<u32> {
        self.position
    }

    fn set_position(&mut self, position: u32) {
        self.position = Some(position);
    }
}

/// One `{id, position}` pair of a batch position update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PositionUpdate<Id> {
    pub id: Id,
    pub position: u32,
}

/// Sort into display order: ascending position, unpositioned items last.
///
/// The sort is stable, so items with equal (or no) position keep their
/// relative order.
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    items.sort_by_key(|item| (item.position().is_none(), item.position()));
}

/// Move the item at `from` so that it ends up at index `to`.
///
/// This is an array move, not a swap: every item between the two indices
/// shifts by one. Out-of-range indices leave the list untouched.
#[must_use]
pub fn reorder<T>(mut items: Vec<T>, from: usize, to: usize) -> Vec<T> {
    if from == to || from >= items.len() || to >= items.len() {
        return items;
    }
    let item = items.remove(from);
    items.insert(to, item);
    items
}

/// Assign contiguous 1-based positions in current order.
///
/// Returns the matching persistence batch.
pub fn normalize<T: Positioned>(items: &mut [T]) -> Vec<PositionUpdate<T::Id>> {
    items
        .iter_mut()
        .zip(1_u32..)
        .map(|(item, position)| {
            item.set_position(position);
            PositionUpdate {
                id: item.id().clone(),
                position,
            }
        })
        .collect()
}
