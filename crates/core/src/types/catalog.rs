//! Catalog entities owned by the Catalog Store.
//!
//! These are the canonical shapes the rest of the workspace works with.
//! Deserialization accepts the Catalog Store's loose JSON (see the private
//! `wire` module) and normalizes it once, here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, SubcategoryId};
use super::mode::Mode;
use super::price::Price;
use super::wire::{self, RawRef};

/// A top-level catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub name: String,
    /// Whether products in this category are organised into subcategories.
    #[serde(default, deserialize_with = "wire::flag")]
    pub has_subcategory: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "wire::flag")]
    pub is_retail: bool,
    #[serde(default, deserialize_with = "wire::flag")]
    pub is_wholesale: bool,
}

impl Category {
    /// The mode this category is visible in, if its flags are consistent.
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        Mode::from_flags(self.is_retail, self.is_wholesale)
    }
}

/// A subcategory within one owning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSubcategory")]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: SubcategoryId,
    pub name: String,
    /// Owning category. `None` only when the owner was deleted out of band.
    pub category_id: Option<CategoryId>,
    /// Owner's name, when the Catalog Store populated the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub image: Option<String>,
    /// Manual display order; `None` means unordered.
    pub position: Option<u32>,
    pub is_retail: bool,
    pub is_wholesale: bool,
}

impl Subcategory {
    /// Whether this subcategory is owned by `category`.
    #[must_use]
    pub fn belongs_to(&self, category: &CategoryId) -> bool {
        self.category_id.as_ref() == Some(category)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubcategory {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    name: String,
    #[serde(default)]
    category_id: Option<RawRef>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "wire::opt_u32")]
    position: Option<u32>,
    #[serde(default, deserialize_with = "wire::flag")]
    is_retail: bool,
    #[serde(default, deserialize_with = "wire::flag")]
    is_wholesale: bool,
}

impl From<RawSubcategory> for Subcategory {
    fn from(raw: RawSubcategory) -> Self {
        let (category_id, category_name) = raw
            .category_id
            .map(RawRef::into_parts)
            .filter(|(id, _)| !id.is_empty())
            .map_or((None, None), |(id, name)| (Some(CategoryId::new(id)), name));

        Self {
            id: SubcategoryId::new(raw.id),
            name: raw.name,
            category_id,
            category_name,
            image: raw.image.filter(|s| !s.trim().is_empty()),
            position: raw.position,
            is_retail: raw.is_retail,
            is_wholesale: raw.is_wholesale,
        }
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawProduct")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Retail strikethrough reference price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mrp: Option<Price>,
    /// Units in stock; zero means unavailable.
    pub stock: u32,
    /// Minimum order quantity.
    pub moq: u32,
    /// Manual display order; `None` means unordered.
    pub position: Option<u32>,
    /// Active flag toggled from the product list.
    pub status: bool,
    /// Wholesale pack weight label (e.g. `"1kg"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Category associations, deduplicated, in server order.
    pub category_ids: Vec<CategoryId>,
    /// Subcategory associations; the first entry is the primary one.
    pub subcategory_ids: Vec<SubcategoryId>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub is_retail: bool,
    pub is_wholesale: bool,
    pub is_best_seller: bool,
}

impl Product {
    /// Whether this product is associated with `category`.
    #[must_use]
    pub fn belongs_to(&self, category: &CategoryId) -> bool {
        self.category_ids.contains(category)
    }

    /// The primary (first) subcategory association, if any.
    #[must_use]
    pub fn primary_subcategory(&self) -> Option<&SubcategoryId> {
        self.subcategory_ids.first()
    }

    /// Whether the product can currently be ordered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// The mode this product is visible in, if its flags are consistent.
    #[must_use]
    pub const fn mode(&self) -> Option<Mode> {
        Mode::from_flags(self.is_retail, self.is_wholesale)
    }
}

const fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "wire::opt_decimal")]
    price: Option<Decimal>,
    #[serde(default, alias = "oldPrice", deserialize_with = "wire::opt_decimal")]
    mrp: Option<Decimal>,
    #[serde(default, deserialize_with = "wire::u32_or_zero")]
    stock: u32,
    #[serde(default, deserialize_with = "wire::u32_or_zero")]
    moq: u32,
    #[serde(default, deserialize_with = "wire::opt_u32")]
    position: Option<u32>,
    #[serde(default = "default_true", deserialize_with = "wire::flag")]
    status: bool,
    #[serde(default, deserialize_with = "wire::opt_label")]
    weight: Option<String>,
    #[serde(default)]
    category_id: Option<RawRef>,
    #[serde(default)]
    category_ids: Option<Vec<Option<RawRef>>>,
    #[serde(default)]
    subcategory_id: Option<RawRef>,
    #[serde(default)]
    subcategory_ids: Option<Vec<Option<RawRef>>>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default, deserialize_with = "wire::flag")]
    is_retail: bool,
    #[serde(default, deserialize_with = "wire::flag")]
    is_wholesale: bool,
    #[serde(default, deserialize_with = "wire::flag")]
    is_best_seller: bool,
}

/// Collapse plural and singular reference fields into one deduplicated list.
///
/// Plural entries come first, in server order, so the primary association is
/// preserved; the singular field is appended if it is not already present.
fn collect_refs(plural: Option<Vec<Option<RawRef>>>, singular: Option<RawRef>) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let candidates = plural.into_iter().flatten().flatten().chain(singular);
    for id in candidates.map(|r| r.into_parts().0) {
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let category_ids = collect_refs(raw.category_ids, raw.category_id)
            .into_iter()
            .map(CategoryId::new)
            .collect();
        let subcategory_ids = collect_refs(raw.subcategory_ids, raw.subcategory_id)
            .into_iter()
            .map(SubcategoryId::new)
            .collect();

        Self {
            id: ProductId::new(raw.id),
            name: raw.name,
            price: Price::new(raw.price.unwrap_or_default()),
            mrp: raw.mrp.map(Price::new),
            stock: raw.stock,
            moq: raw.moq,
            position: raw.position,
            status: raw.status,
            weight: raw.weight,
            category_ids,
            subcategory_ids,
            image: raw.image.filter(|s| !s.trim().is_empty()),
            images: raw.images.unwrap_or_default(),
            is_retail: raw.is_retail,
            is_wholesale: raw.is_wholesale,
            is_best_seller: raw.is_best_seller,
        }
    }
}
