use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handlers::error::ApiError;
use crate::llm::extract::extract_array;
use crate::llm::generate_content;
use crate::prompts::load_prompt;

const DEFAULT_SEARCH_TERMS_PROMPT: &str = "Given the style profile below, produce a JSON \
array of short product search queries (plain strings) that would find clothing matching \
the style. Return only the JSON array.";

#[derive(Debug, Deserialize)]
pub struct SearchTermsRequest {
    pub style_profile: Value,
}

#[derive(Debug, Serialize)]
pub struct SearchTermsResponse {
    pub terms: Value,
}

/// POST /search-terms — turn a style profile into product search queries.
pub async fn search_terms(
    Json(request): Json<SearchTermsRequest>,
) -> Result<Json<SearchTermsResponse>, ApiError> {
    if request.style_profile.is_null() {
        return Err(ApiError::InvalidRequest(
            "style_profile must not be null".to_string(),
        ));
    }

    let prompt = load_prompt("search-terms", DEFAULT_SEARCH_TERMS_PROMPT);
    let user_content = format!("{prompt}\n\nStyle profile:\n{}", request.style_profile);

    let completion = generate_content(&user_content, &[]).await?;
    if completion.trim().is_empty() {
        return Err(ApiError::EmptyCompletion);
    }

    let terms = extract_array(&completion)?;
    Ok(Json(SearchTermsResponse { terms }))
}
