//! Position boards: drag-and-drop ordering backed by the Catalog Store.
//!
//! A board holds the items of one selected category. A drop is planned by
//! `u1r_core::positions`, applied locally at once, persisted as one batch
//! for the affected group, and then either reconciled with a fresh fetch or
//! rolled back.

mod products;
mod subcategories;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;
use u1r_core::positions::{DropEvent, GroupKey, Grouping, MoveRejected, PositionUpdate, Positioned, ReorderPlan};

use super::optimistic::Optimistic;
use crate::catalog::CatalogError;

pub use products::ProductBoard;
pub use subcategories::SubcategoryBoard;

/// Operator-facing message for a failed position save.
pub const SAVE_FAILED: &str = "Unable to update positions";

/// What happened to a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome<Id> {
    /// New order applied and persisted.
    Saved {
        /// Group that was reordered.
        group: GroupKey,
        /// The batch sent to the Catalog Store.
        updates: Vec<PositionUpdate<Id>>,
    },
    /// Not a valid move. Nothing changed.
    Rejected(MoveRejected),
    /// Another reorder is still being saved. Nothing changed.
    Busy,
    /// No category is selected. Nothing changed.
    NoCategory,
}

/// Set while a reorder is in flight.
#[derive(Debug, Default)]
struct SavingFlag(AtomicBool);

/// Clears the flag on drop.
struct SavingGuard<'a>(&'a AtomicBool);

impl SavingFlag {
    fn try_begin(&self) -> Option<SavingGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SavingGuard(&self.0))
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The ordering state shared by both boards.
#[derive(Debug)]
struct Board<T> {
    items: Optimistic<Vec<T>>,
    saving: SavingFlag,
}

impl<T> Board<T>
where
    T: Positioned + Clone,
{
    fn new() -> Self {
        Self {
            items: Optimistic::new(Vec::new()),
            saving: SavingFlag::default(),
        }
    }

    /// Plan the drop, apply it, persist the affected group and reconcile.
    ///
    /// `partition` groups the current items. `persist` sends the batch.
    /// `reconcile` runs only after a successful save, still under the saving
    /// flag. On a failed save the items are restored and the error returned.
    async fn commit_drop<G, P, PFut, R, RFut>(
        &self,
        event: &DropEvent<T::Id>,
        partition: G,
        persist: P,
        reconcile: R,
    ) -> Result<DropOutcome<T::Id>, CatalogError>
    where
        G: FnOnce(&[T]) -> Grouping<T>,
        P: FnOnce(Vec<PositionUpdate<T::Id>>) -> PFut,
        PFut: Future<Output = Result<(), CatalogError>>,
        R: FnOnce() -> RFut,
        RFut: Future<Output = ()>,
    {
        let Some(_guard) = self.saving.try_begin() else {
            debug!(item = %event.active, "Drop ignored while saving");
            return Ok(DropOutcome::Busy);
        };

        let grouping = self.items.with(|items| partition(items.as_slice())).await;
        let ReorderPlan {
            group, items, updates, ..
        } = match grouping.plan_move(event) {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(item = %event.active, %reason, "Drop rejected");
                return Ok(DropOutcome::Rejected(reason));
            }
        };

        let batch = updates.clone();
        self.items.apply(items, || persist(batch)).await?;
        reconcile().await;

        Ok(DropOutcome::Saved { group, updates })
    }
}
