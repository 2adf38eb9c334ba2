//! Under One Roof admin library.
//!
//! Talks to the Catalog Store REST API on behalf of an admin:
//!
//! - [`catalog`] - the [`CatalogStore`](catalog::CatalogStore) seam and its
//!   HTTP client
//! - [`session`] - bearer-token session and token file
//! - [`services`] - position boards, product list toggles, notifications
//! - [`config`] - environment configuration
//!
//! The ordering logic itself lives in `u1r_core::positions`; this crate adds
//! the I/O around it: optimistic apply, batch persistence, rollback and
//! reconciliation.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod services;
pub mod session;

pub use catalog::{CatalogClient, CatalogError, CatalogStore, ProductField};
pub use config::{AdminConfig, ConfigError};
pub use error::AdminError;
pub use session::{AuthError, Session, TokenFile};
