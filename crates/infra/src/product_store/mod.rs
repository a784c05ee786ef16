//! Product persistence (document-style collection keyed by product id).
//!
//! `ProductStore` is the seam: the query service talks only to the trait,
//! with an in-memory implementation for dev/tests and a Postgres one for
//! deployments.

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use query::{ProductFilter, Window};
pub use r#trait::{ProductStore, ProductStoreError, StoredProduct};
