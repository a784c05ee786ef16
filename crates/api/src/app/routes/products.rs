use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use catalog_core::ProductId;
use catalog_products::ProductFields;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn parse_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>().map_err(|_| errors::invalid_id(raw))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListProductsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(raw) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection(rejection),
    };
    let query = match raw.parse() {
        Ok(q) => q,
        Err(e) => return errors::catalog_error_to_response(e.into(), services.expose_error_details),
    };

    match services.catalog.list_products(&query).await {
        Ok(page) => dto::page_response(page),
        Err(e) => errors::catalog_error_to_response(e, services.expose_error_details),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.get_product(id).await {
        Ok(product) => dto::product_response(StatusCode::OK, product),
        Err(e) => errors::catalog_error_to_response(e, services.expose_error_details),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    match services.catalog.create_product(&input).await {
        Ok(product) => dto::product_response(StatusCode::CREATED, product),
        Err(e) => errors::catalog_error_to_response(e, services.expose_error_details),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductFields>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    match services.catalog.update_product(id, &patch).await {
        Ok(product) => dto::product_response(StatusCode::OK, product),
        Err(e) => errors::catalog_error_to_response(e, services.expose_error_details),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.delete_product(id).await {
        Ok(()) => dto::deleted_response(),
        Err(e) => errors::catalog_error_to_response(e, services.expose_error_details),
    }
}
