//! Turning a drop gesture into a reorder plan.

use super::grouping::{GroupKey, Grouping};
use super::{Positioned, PositionUpdate, normalize, reorder};

/// A completed drag: `active` was released over `over`.
///
/// `over` is `None` when the item was dropped outside any valid target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent<Id> {
    pub active: Id,
    pub over: Option<Id>,
}

impl<Id> DropEvent<Id> {
    #[must_use]
    pub const fn new(active: Id, over: Option<Id>) -> Self {
        Self { active, over }
    }
}

/// Reasons a drop does not produce a reorder. In every case the caller's
/// state is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveRejected {
    /// Dropped outside any item.
    #[error("no drop target")]
    NoTarget,

    /// Dropped onto itself.
    #[error("item dropped onto itself")]
    SameItem,

    /// One of the IDs is not in the current list.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Source and target live in different groups.
    #[error("cannot move an item from \"{from}\" into \"{to}\"")]
    CrossGroup {
        /// Group of the dragged item.
        from: GroupKey,
        /// Group of the drop target.
        to: GroupKey,
    },
}

/// The outcome of an accepted drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan<T: Positioned> {
    /// Group that was reordered.
    pub group: GroupKey,
    /// Index the dragged item left.
    pub from: usize,
    /// Index the dragged item now occupies.
    pub to: usize,
    /// The full list, group after group, with the affected group's new order
    /// and positions substituted in. Other groups are untouched.
    pub items: Vec<T>,
    /// One update per member of the affected group, in new order.
    pub updates: Vec<PositionUpdate<T::Id>>,
}

impl<T: Positioned + Clone> Grouping<T> {
    /// Plan the reorder for a drop, without modifying `self`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveRejected`] when there is no target, the item was dropped
    /// on itself, either item is unknown, or the two items are in different
    /// groups.
    pub fn plan_move(&self, event: &DropEvent<T::Id>) -> Result<ReorderPlan<T>, MoveRejected> {
        let over = event.over.as_ref().ok_or(MoveRejected::NoTarget)?;
        if *over == event.active {
            return Err(MoveRejected::SameItem);
        }

        let source = self
            .group_of(&event.active)
            .ok_or_else(|| MoveRejected::UnknownItem(event.active.to_string()))?;
        let target = self
            .group_of(over)
            .ok_or_else(|| MoveRejected::UnknownItem(over.to_string()))?;
        if source != target {
            return Err(MoveRejected::CrossGroup {
                from: source.clone(),
                to: target.clone(),
            });
        }
        let key = source.clone();

        let mut next = self.clone();
        let group = next
            .groups_mut()
            .iter_mut()
            .find(|g| g.key == key)
            .ok_or_else(|| MoveRejected::UnknownItem(event.active.to_string()))?;

        let position_of = |id: &T::Id| group.items.iter().position(|item| item.id() == id);
        let (Some(from), Some(to)) = (position_of(&event.active), position_of(over)) else {
            return Err(MoveRejected::UnknownItem(event.active.to_string()));
        };

        let mut moved = reorder(std::mem::take(&mut group.items), from, to);
        let updates = normalize(&mut moved);
        group.items = moved;

        Ok(ReorderPlan {
            group: key,
            from,
            to,
            items: next.flatten(),
            updates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::positions::test_support::{ids, product};
    use crate::positions::{PositionUpdate, sort_by_position};
    use crate::types::{Product, ProductId};

    fn by_subcategory(products: &[Product]) -> Grouping<Product> {
        Grouping::build(products, |p| {
            p.primary_subcategory()
                .map_or_else(GroupKey::unassigned, |s| GroupKey::new(s.as_str()))
        })
    }

    fn dropped(active: &str, over: Option<&str>) -> DropEvent<ProductId> {
        DropEvent::new(ProductId::new(active), over.map(ProductId::new))
    }

    fn scenario() -> Vec<Product> {
        vec![
            product("A", Some(2), &["X"]),
            product("B", Some(1), &["X"]),
            product("D", Some(1), &["Y"]),
        ]
    }

    #[test]
    fn test_move_within_group_renumbers_only_that_group() {
        let grouping = by_subcategory(&scenario());

        let plan = grouping.plan_move(&dropped("A", Some("B"))).expect("accepted");

        assert_eq!(plan.group, GroupKey::new("X"));
        assert_eq!((plan.from, plan.to), (1, 0));
        assert_eq!(ids(&plan.items), vec!["A", "B", "D"]);
        assert_eq!(
            plan.updates,
            vec![
                PositionUpdate { id: ProductId::new("A"), position: 1 },
                PositionUpdate { id: ProductId::new("B"), position: 2 },
            ]
        );
        let d = plan.items.iter().find(|p| p.id.as_str() == "D").expect("D kept");
        assert_eq!(d.position, Some(1));
    }

    #[test]
    fn test_cross_group_drop_is_rejected_without_change() {
        let grouping = by_subcategory(&scenario());
        let before = grouping.clone();

        let result = grouping.plan_move(&dropped("A", Some("D")));

        assert_eq!(
            result,
            Err(MoveRejected::CrossGroup {
                from: GroupKey::new("X"),
                to: GroupKey::new("Y"),
            })
        );
        assert_eq!(grouping, before);
    }

    #[test]
    fn test_missing_target_and_self_drop_are_rejected() {
        let grouping = by_subcategory(&scenario());
        assert_eq!(grouping.plan_move(&dropped("A", None)), Err(MoveRejected::NoTarget));
        assert_eq!(grouping.plan_move(&dropped("A", Some("A"))), Err(MoveRejected::SameItem));
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let grouping = by_subcategory(&scenario());
        assert_eq!(
            grouping.plan_move(&dropped("Z", Some("A"))),
            Err(MoveRejected::UnknownItem("Z".to_string()))
        );
    }

    #[test]
    fn test_redrop_at_resulting_index_changes_nothing() {
        let grouping = by_subcategory(&scenario());
        let plan = grouping.plan_move(&dropped("A", Some("B"))).expect("accepted");

        let regrouped = by_subcategory(&plan.items);
        assert_eq!(regrouped.flatten(), plan.items);
        assert_eq!(
            regrouped.plan_move(&dropped("A", Some("A"))),
            Err(MoveRejected::SameItem)
        );
    }

    #[test]
    fn test_positions_always_contiguous_after_move() {
        let products = vec![
            product("p1", Some(9), &["X"]),
            product("p2", None, &["X"]),
            product("p3", Some(9), &["X"]),
            product("p4", Some(2), &["X"]),
            product("p5", None, &["X"]),
        ];
        let grouping = by_subcategory(&products);

        for (active, over) in [("p1", "p5"), ("p5", "p4"), ("p2", "p3")] {
            let plan = grouping.plan_move(&dropped(active, Some(over))).expect("accepted");
            let mut positions: Vec<u32> = plan.updates.iter().map(|u| u.position).collect();
            positions.sort_unstable();
            assert_eq!(positions, (1..=5).collect::<Vec<u32>>());
        }
    }

    #[test]
    fn test_move_to_end_shifts_intermediate_items() {
        let products = vec![
            product("a", Some(1), &[]),
            product("b", Some(2), &[]),
            product("c", Some(3), &[]),
            product("d", Some(4), &[]),
        ];
        let grouping = by_subcategory(&products);

        let plan = grouping.plan_move(&dropped("a", Some("d"))).expect("accepted");

        let mut reordered = plan.items.clone();
        sort_by_position(&mut reordered);
        assert_eq!(ids(&reordered), vec!["b", "c", "d", "a"]);
    }
}
