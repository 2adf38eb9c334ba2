//! Product list: browsing, stock/status toggles and deletion.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use u1r_core::filter::{ProductFilter, weight_options};
use u1r_core::{Mode, Product, ProductId};

use crate::catalog::{CatalogError, CatalogStore, ProductField};
use crate::error::AdminError;
use crate::services::notify::{Notice, Notifier};

const LOAD_FAILED: &str = "Unable to load products";
const STOCK_FAILED: &str = "Could not update product stock";
const STATUS_FAILED: &str = "Could not update product status";
const DELETE_FAILED: &str = "Could not delete product";

/// Which endpoint accepted a single-field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateRoute {
    /// `PUT /api/admin/product/{id}/stock` or `/status`.
    Dedicated,
    /// `PUT /api/admin/product/{id}` with a multipart body.
    Fallback,
}

/// Set one product field, falling back to the generic update endpoint.
///
/// The dedicated endpoint is tried first. If it answers 404 or 405 the same
/// value is sent exactly once as multipart to the generic endpoint. Any
/// other failure is returned as is.
///
/// # Errors
///
/// Returns the `CatalogError` of the last call made.
#[instrument(skip(store), fields(product = %id))]
pub async fn update_field<S: CatalogStore>(
    store: &S,
    id: &ProductId,
    field: ProductField,
) -> Result<UpdateRoute, CatalogError> {
    let dedicated = match field {
        ProductField::Stock(stock) => store.set_product_stock(id, stock).await,
        ProductField::Status(status) => store.set_product_status(id, status).await,
    };

    match dedicated {
        Ok(()) => Ok(UpdateRoute::Dedicated),
        Err(e) if e.is_fallback_eligible() => {
            warn!(
                status = e.status().unwrap_or_default(),
                "Dedicated endpoint unavailable, using product update"
            );
            store.update_product_field(id, field).await?;
            Ok(UpdateRoute::Fallback)
        }
        Err(e) => Err(e),
    }
}

/// The mode's product list, refetched after every change.
pub struct ProductList<S> {
    store: S,
    mode: Mode,
    notifier: Arc<dyn Notifier>,
    products: RwLock<Vec<Product>>,
}

impl<S: CatalogStore> ProductList<S> {
    pub fn new(store: S, mode: Mode, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            mode,
            notifier,
            products: RwLock::new(Vec::new()),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Refetch the list.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the list cannot be fetched; the
    /// cached list is kept.
    pub async fn refresh(&self) -> Result<(), AdminError> {
        let products = self
            .store
            .products(self.mode)
            .await
            .map_err(|e| self.fail(e.during(LOAD_FAILED)))?;
        *self.products.write().await = products;
        Ok(())
    }

    pub async fn products(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    /// Cached products passing `filter`, in fetch order.
    pub async fn filtered(&self, filter: &ProductFilter) -> Vec<Product> {
        let products = self.products.read().await;
        filter
            .apply(&products, self.mode)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Weight labels available for filtering.
    pub async fn weight_options(&self) -> Vec<String> {
        weight_options(&self.products.read().await, self.mode)
    }

    /// Flip availability: in stock becomes `0`, out of stock becomes `1`.
    ///
    /// Returns the stock value that was sent.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product is not in the cached
    /// list, or `AdminError::Catalog` if the update fails.
    pub async fn toggle_stock(&self, id: &ProductId) -> Result<u32, AdminError> {
        let product = self.cached(id).await?;
        let desired = if product.stock > 0 { 0 } else { 1 };
        self.set_field(id, ProductField::Stock(desired)).await?;
        Ok(desired)
    }

    /// Flip the active flag. Returns the status that was sent.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product is not in the cached
    /// list, or `AdminError::Catalog` if the update fails.
    pub async fn toggle_status(&self, id: &ProductId) -> Result<bool, AdminError> {
        let product = self.cached(id).await?;
        let desired = !product.status;
        self.set_field(id, ProductField::Status(desired)).await?;
        Ok(desired)
    }

    /// Set one field to an explicit value, then refetch the list.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the update fails. The cached list
    /// is left unchanged and the failure is sent to the notifier.
    pub async fn set_field(
        &self,
        id: &ProductId,
        field: ProductField,
    ) -> Result<UpdateRoute, AdminError> {
        let context = match field {
            ProductField::Stock(_) => STOCK_FAILED,
            ProductField::Status(_) => STATUS_FAILED,
        };
        let route = update_field(&self.store, id, field)
            .await
            .map_err(|e| self.fail(e.during(context)))?;
        info!(product = %id, ?field, ?route, "Product updated");

        self.refresh_after_change().await;
        Ok(route)
    }

    /// Delete a product, then refetch the list.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Catalog` if the deletion fails.
    #[instrument(skip(self), fields(product = %id))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), AdminError> {
        self.store
            .delete_product(id)
            .await
            .map_err(|e| self.fail(e.during(DELETE_FAILED)))?;
        info!(product = %id, "Product deleted");

        self.refresh_after_change().await;
        Ok(())
    }

    async fn cached(&self, id: &ProductId) -> Result<Product, AdminError> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("product {id}")))
    }

    async fn refresh_after_change(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Change saved but refetch failed");
        }
    }

    fn fail(&self, err: AdminError) -> AdminError {
        err.report();
        self.notifier.notify(Notice::error(err.user_message()));
        err
    }
}
