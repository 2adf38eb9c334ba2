//! Admin services built on a [`CatalogStore`](crate::catalog::CatalogStore).
//!
//! # Services
//!
//! - `positions` - product and subcategory position boards
//! - `products` - product list with stock/status toggles and deletion
//! - `optimistic` - apply-then-commit local state with rollback
//! - `notify` - operator notifications

pub mod notify;
pub mod optimistic;
pub mod positions;
pub mod products;

pub use notify::{Level, Notice, NoticeLog, Notifier, TracingNotifier};
pub use optimistic::Optimistic;
pub use positions::{DropOutcome, ProductBoard, SubcategoryBoard};
pub use products::{ProductList, UpdateRoute, update_field};
