//! Ordering subcategories within their category.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use u1r_core::positions::{DropEvent, Grouping, group_subcategories};
use u1r_core::{Category, CategoryId, Mode, Subcategory, SubcategoryId};

use super::{Board, DropOutcome, SAVE_FAILED};
use crate::catalog::{CatalogError, CatalogStore};
use crate::error::AdminError;
use crate::services::notify::{Notice, Notifier};

const LOAD_FAILED: &str = "Unable to load subcategories";

/// Subcategory ordering for one selected category. Cheap to clone.
pub struct SubcategoryBoard<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    mode: Mode,
    notifier: Arc<dyn Notifier>,
    categories: RwLock<Vec<Category>>,
    selected: RwLock<Option<Category>>,
    board: Board<Subcategory>,
}

impl<S> Clone for SubcategoryBoard<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CatalogStore> SubcategoryBoard<S> {
    pub fn new(store: S, mode: Mode, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                mode,
                notifier,
                categories: RwLock::new(Vec::new()),
                selected: RwLock::new(None),
                board: Board::new(),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Fetch the categories of the board's mode.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the list cannot be fetched.
    pub async fn load(&self) -> Result<(), AdminError> {
        let categories = self
            .inner
            .store
            .categories(self.inner.mode)
            .await
            .map_err(|e| self.fail(e.during("Unable to load categories")))?;
        *self.inner.categories.write().await = categories;
        Ok(())
    }

    /// Select a loaded category and fetch its subcategories. On failure the
    /// previous selection is kept.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the category was not loaded, or
    /// `AdminError::Catalog` if the subcategories cannot be fetched.
    pub async fn select_category(&self, id: &CategoryId) -> Result<(), AdminError> {
        let category = self
            .inner
            .categories
            .read()
            .await
            .iter()
            .find(|c| &c.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("category {id}")))?;

        let subcategories = self
            .fetch(&category)
            .await
            .map_err(|e| self.fail(e.during(LOAD_FAILED)))?;
        let mut selected = self.inner.selected.write().await;
        self.inner.board.items.set(subcategories).await;
        *selected = Some(category);
        Ok(())
    }

    /// Refetch the selected category's subcategories.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the list cannot be fetched; the
    /// current list is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AdminError> {
        let Some(category) = self.inner.selected.read().await.clone() else {
            self.inner.board.items.set(Vec::new()).await;
            return Ok(());
        };
        self.inner
            .board
            .items
            .reconcile(|| self.fetch(&category))
            .await
            .map_err(|e| self.fail(e.during(LOAD_FAILED)))
    }

    async fn fetch(&self, category: &Category) -> Result<Vec<Subcategory>, CatalogError> {
        let subcategories = self.inner.store.subcategories(self.inner.mode).await?;
        Ok(subcategories
            .into_iter()
            .filter(|s| s.belongs_to(&category.id))
            .collect())
    }

    /// The selected category's subcategories in display order.
    pub async fn grouping(&self) -> Grouping<Subcategory> {
        let Some(category) = self.inner.selected.read().await.clone() else {
            return Grouping::default();
        };
        self.inner
            .board
            .items
            .with(|items| group_subcategories(items, &category))
            .await
    }

    pub fn is_saving(&self) -> bool {
        self.inner.board.saving.is_set()
    }

    /// Handle a completed drag; see [`super::ProductBoard::drop_item`].
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` when the batch update fails.
    #[instrument(skip(self), fields(item = %event.active))]
    pub async fn drop_item(
        &self,
        event: &DropEvent<SubcategoryId>,
    ) -> Result<DropOutcome<SubcategoryId>, AdminError> {
        let Some(category) = self.inner.selected.read().await.clone() else {
            return Ok(DropOutcome::NoCategory);
        };
        let store = &self.inner.store;
        let mode = self.inner.mode;
        let category_id = &category.id;

        let outcome = self
            .inner
            .board
            .commit_drop(
                event,
                |items| group_subcategories(items, &category),
                |updates| async move {
                    store
                        .update_subcategory_positions(mode, category_id, &updates)
                        .await
                },
                || async {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "Positions saved but refetch failed");
                    }
                },
            )
            .await
            .map_err(|e| self.fail(e.during(SAVE_FAILED)))?;

        if let DropOutcome::Saved { updates, .. } = &outcome {
            info!(category = %category.id, count = updates.len(), "Subcategory positions saved");
        }
        Ok(outcome)
    }

    fn fail(&self, err: AdminError) -> AdminError {
        err.report();
        self.inner.notifier.notify(Notice::error(err.user_message()));
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use u1r_core::positions::{GroupKey, PositionUpdate};

    use super::*;
    use crate::catalog::fake::{Call, FakeStore, category, subcategory};
    use crate::services::notify::NoticeLog;

    fn update(id: &str, position: u32) -> PositionUpdate<SubcategoryId> {
        PositionUpdate {
            id: SubcategoryId::new(id),
            position,
        }
    }

    async fn board() -> (SubcategoryBoard<FakeStore>, Arc<NoticeLog>) {
        let store = FakeStore::new(
            vec![category("cat", "Grains", true), category("household", "Household", true)],
            vec![
                subcategory("rice", "Rice", "cat", Some(1)),
                subcategory("dal", "Dal", "cat", Some(2)),
                subcategory("atta", "Atta", "cat", None),
                subcategory("soap", "Soap", "household", Some(1)),
            ],
            vec![],
        );
        let log = Arc::new(NoticeLog::default());
        let board = SubcategoryBoard::new(store, Mode::Wholesale, log.clone());
        board.load().await.unwrap();
        board.select_category(&CategoryId::new("cat")).await.unwrap();
        (board, log)
    }

    fn names(grouping: &Grouping<Subcategory>) -> Vec<String> {
        grouping.flatten().into_iter().map(|s| s.name).collect()
    }

    #[tokio::test]
    async fn test_single_group_named_after_category() {
        let (board, _) = board().await;
        let grouping = board.grouping().await;
        assert_eq!(grouping.keys().collect::<Vec<_>>(), vec![&GroupKey::new("Grains")]);
        assert_eq!(names(&grouping), vec!["Rice", "Dal", "Atta"]);
    }

    #[tokio::test]
    async fn test_drop_persists_with_category_and_renumbers() {
        let (board, _) = board().await;
        let event = DropEvent::new(SubcategoryId::new("atta"), Some(SubcategoryId::new("rice")));

        let outcome = board.drop_item(&event).await.unwrap();

        let expected = vec![update("atta", 1), update("rice", 2), update("dal", 3)];
        assert_eq!(
            outcome,
            DropOutcome::Saved {
                group: GroupKey::new("Grains"),
                updates: expected.clone(),
            }
        );
        assert!(
            board
                .store()
                .calls()
                .contains(&Call::SubcategoryPositions(CategoryId::new("cat"), expected))
        );
        assert_eq!(names(&board.grouping().await), vec!["Atta", "Rice", "Dal"]);
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back() {
        let (board, log) = board().await;
        board.store().state().fail_positions = Some(500);
        let event = DropEvent::new(SubcategoryId::new("dal"), Some(SubcategoryId::new("rice")));

        let err = board.drop_item(&event).await.unwrap_err();

        assert_eq!(err.user_message(), "Unable to update positions");
        assert_eq!(names(&board.grouping().await), vec!["Rice", "Dal", "Atta"]);
        assert_eq!(log.take().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_selection_keeps_previous_category() {
        let (board, log) = board().await;
        board.store().state().fail_subcategories = Some(503);

        let err = board
            .select_category(&CategoryId::new("household"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Unable to load subcategories");
        assert_eq!(log.take().len(), 1);
        assert_eq!(names(&board.grouping().await), vec!["Rice", "Dal", "Atta"]);

        board.store().state().fail_subcategories = None;
        let event = DropEvent::new(SubcategoryId::new("dal"), Some(SubcategoryId::new("rice")));
        let outcome = board.drop_item(&event).await.unwrap();

        assert!(matches!(outcome, DropOutcome::Saved { ref group, .. } if group == &GroupKey::new("Grains")));
        let expected = vec![update("dal", 1), update("rice", 2), update("atta", 3)];
        assert!(
            board
                .store()
                .calls()
                .contains(&Call::SubcategoryPositions(CategoryId::new("cat"), expected))
        );
    }
}
