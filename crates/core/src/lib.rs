//! `catalog-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the product identifier and the error model shared by every layer.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult, FieldError};
pub use id::ProductId;
