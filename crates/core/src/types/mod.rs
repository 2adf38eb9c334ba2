//! Core types for the Under One Roof catalog.
//!
//! This module provides type-safe wrappers for catalog entities as the
//! Catalog Store returns them, normalized at the deserialization boundary.

pub mod catalog;
pub mod email;
pub mod envelope;
pub mod id;
pub mod mode;
pub mod price;
mod wire;

pub use catalog::{Category, Product, Subcategory};
pub use email::{Email, EmailError};
pub use envelope::ListEnvelope;
pub use id::*;
pub use mode::{Mode, ModeError};
pub use price::{Price, format_inr};
