//! In-memory Catalog Store for service tests.

use std::sync::{Mutex, MutexGuard};

use u1r_core::positions::{PositionUpdate, Positioned};
use u1r_core::{Category, CategoryId, Mode, Product, ProductId, Subcategory, SubcategoryId};

use super::{CatalogError, CatalogStore, ProductField};

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Categories,
    Subcategories,
    Products,
    ProductPositions(Vec<PositionUpdate<ProductId>>),
    SubcategoryPositions(CategoryId, Vec<PositionUpdate<SubcategoryId>>),
    Stock(ProductId, u32),
    Status(ProductId, bool),
    Field(ProductId, ProductField),
    Delete(ProductId),
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
    pub products: Vec<Product>,
    pub calls: Vec<Call>,
    /// Status code returned by every position update.
    pub fail_positions: Option<u16>,
    /// Status code returned by the dedicated stock/status endpoints.
    pub fail_dedicated: Option<u16>,
    /// Status code returned by the multipart update endpoint.
    pub fail_field_update: Option<u16>,
    /// Status code returned by product listing.
    pub fail_products: Option<u16>,
    /// Status code returned by subcategory listing.
    pub fail_subcategories: Option<u16>,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

fn failure(status: u16) -> CatalogError {
    CatalogError::Status {
        status,
        message: None,
    }
}

fn fail_with(status: Option<u16>) -> Result<(), CatalogError> {
    status.map_or(Ok(()), |s| Err(failure(s)))
}

fn apply_positions<T: Positioned>(items: &mut [T], updates: &[PositionUpdate<T::Id>]) {
    for update in updates {
        if let Some(item) = items.iter_mut().find(|i| i.id() == &update.id) {
            item.set_position(update.position);
        }
    }
}

impl FakeStore {
    pub fn new(categories: Vec<Category>, subcategories: Vec<Subcategory>, products: Vec<Product>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                categories,
                subcategories,
                products,
                ..FakeState::default()
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake store lock")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    fn record(&self, call: Call) -> MutexGuard<'_, FakeState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

impl CatalogStore for FakeStore {
    async fn categories(&self, _mode: Mode) -> Result<Vec<Category>, CatalogError> {
        Ok(self.record(Call::Categories).categories.clone())
    }

    async fn subcategories(&self, _mode: Mode) -> Result<Vec<Subcategory>, CatalogError> {
        let state = self.record(Call::Subcategories);
        fail_with(state.fail_subcategories)?;
        Ok(state.subcategories.clone())
    }

    async fn products(&self, _mode: Mode) -> Result<Vec<Product>, CatalogError> {
        let state = self.record(Call::Products);
        fail_with(state.fail_products)?;
        Ok(state.products.clone())
    }

    async fn update_product_positions(
        &self,
        updates: &[PositionUpdate<ProductId>],
    ) -> Result<(), CatalogError> {
        let mut state = self.record(Call::ProductPositions(updates.to_vec()));
        fail_with(state.fail_positions)?;
        apply_positions(&mut state.products, updates);
        Ok(())
    }

    async fn update_subcategory_positions(
        &self,
        _mode: Mode,
        category: &CategoryId,
        updates: &[PositionUpdate<SubcategoryId>],
    ) -> Result<(), CatalogError> {
        let mut state = self.record(Call::SubcategoryPositions(category.clone(), updates.to_vec()));
        fail_with(state.fail_positions)?;
        apply_positions(&mut state.subcategories, updates);
        Ok(())
    }

    async fn set_product_stock(&self, id: &ProductId, stock: u32) -> Result<(), CatalogError> {
        let mut state = self.record(Call::Stock(id.clone(), stock));
        fail_with(state.fail_dedicated)?;
        if let Some(p) = state.products.iter_mut().find(|p| &p.id == id) {
            p.stock = stock;
        }
        Ok(())
    }

    async fn set_product_status(&self, id: &ProductId, status: bool) -> Result<(), CatalogError> {
        let mut state = self.record(Call::Status(id.clone(), status));
        fail_with(state.fail_dedicated)?;
        if let Some(p) = state.products.iter_mut().find(|p| &p.id == id) {
            p.status = status;
        }
        Ok(())
    }

    async fn update_product_field(
        &self,
        id: &ProductId,
        field: ProductField,
    ) -> Result<(), CatalogError> {
        let mut state = self.record(Call::Field(id.clone(), field));
        fail_with(state.fail_field_update)?;
        if let Some(p) = state.products.iter_mut().find(|p| &p.id == id) {
            match field {
                ProductField::Stock(stock) => p.stock = stock,
                ProductField::Status(status) => p.status = status,
            }
        }
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), CatalogError> {
        let mut state = self.record(Call::Delete(id.clone()));
        state.products.retain(|p| &p.id != id);
        Ok(())
    }
}

pub fn category(id: &str, name: &str, has_subcategory: bool) -> Category {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "name": name,
        "hasSubcategory": has_subcategory,
        "isWholesale": true,
    }))
    .expect("fixture category")
}

pub fn subcategory(id: &str, name: &str, category: &str, position: Option<u32>) -> Subcategory {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "name": name,
        "categoryId": category,
        "position": position,
        "isWholesale": true,
    }))
    .expect("fixture subcategory")
}

pub fn product(id: &str, category: &str, position: Option<u32>, subcategories: &[&str]) -> Product {
    serde_json::from_value(serde_json::json!({
        "_id": id,
        "name": format!("Product {id}"),
        "price": "120.00",
        "stock": 3,
        "moq": 1,
        "status": true,
        "categoryId": category,
        "subcategoryIds": subcategories,
        "position": position,
        "isWholesale": true,
    }))
    .expect("fixture product")
}
