//! Catalog Store access.
//!
//! [`CatalogStore`] is the seam between the admin services and the remote
//! REST API. [`CatalogClient`] implements it over HTTP; service tests use an
//! in-memory store instead.

pub mod assets;
mod client;
mod error;
#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use u1r_core::positions::PositionUpdate;
use u1r_core::{Category, CategoryId, Mode, Product, ProductId, Subcategory, SubcategoryId};

pub use client::CatalogClient;
pub use error::CatalogError;

/// A single-field product update sent as multipart form data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    /// Availability: `0` (out of stock) or `1`.
    Stock(u32),
    /// Active flag.
    Status(bool),
}

impl ProductField {
    /// Form field name and value.
    #[must_use]
    pub fn form_pair(self) -> (&'static str, String) {
        match self {
            Self::Stock(stock) => ("stock", stock.to_string()),
            Self::Status(status) => ("status", status.to_string()),
        }
    }
}

/// Operations the admin services need from the Catalog Store.
pub trait CatalogStore: Send + Sync {
    /// `GET /api/admin/category?mode=`
    fn categories(&self, mode: Mode)
    -> impl Future<Output = Result<Vec<Category>, CatalogError>> + Send;

    /// `GET /api/admin/subcategory?mode=`
    fn subcategories(
        &self,
        mode: Mode,
    ) -> impl Future<Output = Result<Vec<Subcategory>, CatalogError>> + Send;

    /// `GET /api/admin/product?mode=`
    fn products(&self, mode: Mode)
    -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;

    /// `PATCH /api/admin/product/positions`
    fn update_product_positions(
        &self,
        updates: &[PositionUpdate<ProductId>],
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// `PATCH /api/admin/subcategory/positions?mode=`
    fn update_subcategory_positions(
        &self,
        mode: Mode,
        category: &CategoryId,
        updates: &[PositionUpdate<SubcategoryId>],
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// `PUT /api/admin/product/{id}/stock`
    fn set_product_stock(
        &self,
        id: &ProductId,
        stock: u32,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// `PUT /api/admin/product/{id}/status`
    fn set_product_status(
        &self,
        id: &ProductId,
        status: bool,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// `PUT /api/admin/product/{id}` (multipart, only the given field)
    fn update_product_field(
        &self,
        id: &ProductId,
        field: ProductField,
    ) -> impl Future<Output = Result<(), CatalogError>> + Send;

    /// `DELETE /api/admin/product/{id}`
    fn delete_product(&self, id: &ProductId)
    -> impl Future<Output = Result<(), CatalogError>> + Send;
}
