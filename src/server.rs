use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{explain, products, style, terms};

// Generous enough for phone-camera uploads; the normalizer shrinks them
// before they reach the LLM.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/eval-style", post(style::eval_style))
        .route("/search-terms", post(terms::search_terms))
        .route("/search-products", post(products::search_products))
        .route("/explain", post(explain::explain_simply))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
