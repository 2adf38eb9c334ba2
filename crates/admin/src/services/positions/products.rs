//! Ordering products within a category.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use u1r_core::positions::{DropEvent, Grouping, group_products};
use u1r_core::{Category, CategoryId, Mode, Product, ProductId, Subcategory};

use super::{Board, DropOutcome, SAVE_FAILED};
use crate::catalog::{CatalogError, CatalogStore};
use crate::error::AdminError;
use crate::services::notify::{Notice, Notifier};

const LOAD_CATEGORIES_FAILED: &str = "Unable to load categories";
const LOAD_PRODUCTS_FAILED: &str = "Unable to load products for category";

/// Product ordering for one selected category.
///
/// Products are grouped by primary subcategory (or kept in one flat group)
/// and can only be moved within their group. Cheap to clone.
pub struct ProductBoard<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    store: S,
    mode: Mode,
    notifier: Arc<dyn Notifier>,
    categories: RwLock<Vec<Category>>,
    subcategories: RwLock<Vec<Subcategory>>,
    selected: RwLock<Option<Category>>,
    board: Board<Product>,
}

impl<S> Clone for ProductBoard<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: CatalogStore> ProductBoard<S> {
    pub fn new(store: S, mode: Mode, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                mode,
                notifier,
                categories: RwLock::new(Vec::new()),
                subcategories: RwLock::new(Vec::new()),
                selected: RwLock::new(None),
                board: Board::new(),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Fetch the categories and subcategories of the board's mode.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if either list cannot be fetched. The
    /// failure is also sent to the notifier.
    #[instrument(skip(self), fields(mode = %self.inner.mode))]
    pub async fn load(&self) -> Result<(), AdminError> {
        let mode = self.inner.mode;
        let categories = self
            .inner
            .store
            .categories(mode)
            .await
            .map_err(|e| self.fail(e.during(LOAD_CATEGORIES_FAILED)))?;
        let subcategories = self
            .inner
            .store
            .subcategories(mode)
            .await
            .map_err(|e| self.fail(e.during(LOAD_CATEGORIES_FAILED)))?;

        *self.inner.categories.write().await = categories;
        *self.inner.subcategories.write().await = subcategories;
        Ok(())
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.inner.categories.read().await.clone()
    }

    pub async fn selected(&self) -> Option<Category> {
        self.inner.selected.read().await.clone()
    }

    /// Select a loaded category and fetch its products.
    ///
    /// The selection only changes once the products have been fetched.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the category was not loaded, or
    /// `AdminError::Catalog` if its products cannot be fetched.
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

        let products = self
            .fetch(&category)
            .await
            .map_err(|e| self.fail(e.during(LOAD_PRODUCTS_FAILED)))?;
        let mut selected = self.inner.selected.write().await;
        self.inner.board.items.set(products).await;
        *selected = Some(category);
        Ok(())
    }

    /// Refetch the selected category's products.
    ///
    /// Products are scoped client side: the mode's full list is fetched and
    /// filtered by category association. With no category selected the
    /// board is emptied.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the products cannot be fetched; the
    /// current list is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AdminError> {
        let Some(category) = self.selected().await else {
            self.inner.board.items.set(Vec::new()).await;
            return Ok(());
        };
        self.inner
            .board
            .items
            .reconcile(|| self.fetch(&category))
            .await
            .map_err(|e| self.fail(e.during(LOAD_PRODUCTS_FAILED)))
    }

    async fn fetch(&self, category: &Category) -> Result<Vec<Product>, CatalogError> {
        let products = self.inner.store.products(self.inner.mode).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.belongs_to(&category.id))
            .collect())
    }

    /// The selected category's products, in fetch order.
    pub async fn products(&self) -> Vec<Product> {
        self.inner.board.items.get().await
    }

    /// The selected category's products as displayed: grouped and ordered.
    pub async fn grouping(&self) -> Grouping<Product> {
        let Some(category) = self.selected().await else {
            return Grouping::default();
        };
        let subcategories = self.inner.subcategories.read().await;
        self.inner
            .board
            .items
            .with(|items| group_products(items, &category, &subcategories))
            .await
    }

    /// Whether a reorder is being saved.
    pub fn is_saving(&self) -> bool {
        self.inner.board.saving.is_set()
    }

    /// Handle a completed drag.
    ///
    /// Invalid drops and drops while saving change nothing. A valid drop is
    /// shown at once, the affected group is sent as one batch, and the
    /// category is refetched. If the batch fails the previous order is
    /// restored.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` when the batch update fails. The
    /// failure is also sent to the notifier.
    #[instrument(skip(self), fields(item = %event.active))]
    pub async fn drop_item(
        &self,
        event: &DropEvent<ProductId>,
    ) -> Result<DropOutcome<ProductId>, AdminError> {
        let Some(category) = self.selected().await else {
            return Ok(DropOutcome::NoCategory);
        };
        let subcategories = self.inner.subcategories.read().await.clone();
        let store = &self.inner.store;

        let outcome = self
            .inner
            .board
            .commit_drop(
                event,
                |items| group_products(items, &category, &subcategories),
                |updates| async move { store.update_product_positions(&updates).await },
                || async {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "Positions saved but refetch failed");
                    }
                },
            )
            .await
            .map_err(|e| self.fail(e.during(SAVE_FAILED)))?;

        if let DropOutcome::Saved { group, updates } = &outcome {
            info!(category = %category.id, %group, count = updates.len(), "Product positions saved");
        }
        Ok(outcome)
    }

    fn fail(&self, err: AdminError) -> AdminError {
        err.report();
        self.inner.notifier.notify(Notice::error(err.user_message()));
        err
    }
}
