//! Catalog query service.
//!
//! Translates caller-supplied filter/pagination parameters into bounded,
//! deterministic reads, runs the normalizer on writes, and formats persisted
//! records into their wire representation.

pub mod query;
pub mod service;
pub mod view;

pub use query::{ProductQuery, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use service::{CatalogError, ProductCatalog};
pub use view::{ProductPage, ProductView};
