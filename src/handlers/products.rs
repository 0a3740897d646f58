use axum::Json;
use serde::{Deserialize, Serialize};

use crate::commerce::{search_catalog, ProductSummary};
use crate::handlers::error::ApiError;

const DEFAULT_RESULT_LIMIT: u32 = 5;
const MAX_RESULT_LIMIT: u32 = 25;

#[derive(Debug, Deserialize)]
pub struct ProductSearchRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ProductSearchResponse {
    pub products: Vec<ProductSummary>,
}

/// POST /search-products — free-text catalog search via the commerce API.
pub async fn search_products(
    Json(request): Json<ProductSearchRequest>,
) -> Result<Json<ProductSearchResponse>, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::InvalidRequest("query must not be empty".to_string()));
    }

    let limit = request
        .limit
        .unwrap_or(DEFAULT_RESULT_LIMIT)
        .clamp(1, MAX_RESULT_LIMIT);
    let context = request.context.as_deref().unwrap_or_default();

    let products = search_catalog(query, context, limit).await?;
    Ok(Json(ProductSearchResponse { products }))
}
