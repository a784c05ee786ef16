//! Products domain module (schema + normalization).
//!
//! This crate contains the catalog's business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the canonical
//! `Product` shape and the two mutation gates that produce it.

mod coerce;
pub mod images;
pub mod product;

pub use images::{coerce_images, images_from_document, is_http_url};
pub use product::{
    normalize_on_create, normalize_on_update, round_price, Product, ProductFields,
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PRICE_MAX,
};
