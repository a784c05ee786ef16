use axum::Router;

pub mod products;
pub mod system;

/// Product endpoints, mounted at `/products` and at the legacy `/api/products`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/api/products", products::router())
}
