//! Construction material catalog
//!
//! Loads a table of material records, enriches it with an eco-score and a
//! biosourced flag, and serves filtered, sorted, aggregated and exported
//! views of it, plus a wall assembly thermal calculator.

pub mod aggregate;
pub mod assembly;
pub mod card;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod db;
pub mod eco;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod store;

pub use catalog::{Catalog, Enrichment, EnrichmentCache};
pub use error::{CatalogError, Result};
pub use models::{Column, MaterialRecord, MaterialView};
pub use store::RecordStore;
