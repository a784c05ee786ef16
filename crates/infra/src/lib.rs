//! Infrastructure layer: product storage adapters and the catalog query service.

pub mod catalog;
pub mod product_store;
