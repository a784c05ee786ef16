use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::FieldError;
use catalog_infra::catalog::CatalogError;

pub fn catalog_error_to_response(err: CatalogError, expose_details: bool) -> axum::response::Response {
    match err {
        CatalogError::Validation(errors) => validation_error(errors),
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        CatalogError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        CatalogError::Store(e) => {
            tracing::error!(error = %e, "product store failure");
            let message = if expose_details {
                e.to_string()
            } else {
                "internal server error".to_string()
            };
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 listing every offending field.
pub fn validation_error(errors: Vec<FieldError>) -> axum::response::Response {
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "success": false,
            "error": "validation_error",
            "message": message,
            "errors": errors,
        })),
    )
        .into_response()
}

pub fn invalid_id(raw: &str) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "invalid_id",
        format!("invalid product id `{raw}`"),
    )
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_json", rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}
