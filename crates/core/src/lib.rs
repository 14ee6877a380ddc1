//! Core types and shared functionality for reelgear.
//!
//! This crate provides:
//! - Catalog data model and the spec registry for all category kinds
//! - The `CatalogStore` contract with its SQLite implementation
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod models;
pub mod specs;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use models::{Brand, BrandLink, CatalogItem, Category, ItemFilter};
pub use specs::{SpecKind, SpecRecord, SpecValue, Specs};
pub use store::{CatalogDb, CatalogImport, CatalogStore, ImportSummary};
