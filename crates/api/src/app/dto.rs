use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use catalog_core::DomainResult;
use catalog_infra::catalog::{ProductPage, ProductQuery, ProductView};

// -------------------------
// Request DTOs
// -------------------------

/// Raw listing parameters; numbers stay strings until `ProductQuery::parse`
/// so malformed values produce a field-level error instead of a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ListProductsQuery {
    pub fn parse(&self) -> DomainResult<ProductQuery> {
        ProductQuery::parse(
            self.page.as_deref(),
            self.limit.as_deref(),
            self.category.as_deref(),
            self.search.as_deref(),
        )
    }
}

// -------------------------
// Response envelopes
// -------------------------

pub fn product_response(status: StatusCode, product: ProductView) -> axum::response::Response {
    (
        status,
        axum::Json(serde_json::json!({
            "success": true,
            "data": product,
        })),
    )
        .into_response()
}

pub fn page_response(page: ProductPage) -> axum::response::Response {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({
            "success": true,
            "count": page.count,
            "total": page.total,
            "page": page.page,
            "pages": page.pages,
            "data": page.data,
        })),
    )
        .into_response()
}

pub fn deleted_response() -> axum::response::Response {
    (StatusCode::OK, axum::Json(serde_json::json!({ "success": true }))).into_response()
}
