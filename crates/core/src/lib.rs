//! Under One Roof Core - Catalog types and position reordering.
//!
//! This crate provides the pieces of the admin console that do not touch the
//! network. The other workspace crates build on it:
//! - `admin` - Catalog Store client, session handling and admin services
//! - `cli` - Command-line console for catalog administration
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no clocks. Everything here can be unit tested in isolation from
//! the Catalog Store.
//!
//! # Modules
//!
//! - [`types`] - Catalog entities, type-safe IDs, modes, prices and emails
//! - [`positions`] - Grouping, drag-and-drop reordering and position normalization
//! - [`filter`] - Client-side product list filtering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod positions;
pub mod types;

pub use types::*;
