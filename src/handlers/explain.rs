use axum::Json;
use serde::Deserialize;

use crate::handlers::error::ApiError;
use crate::handlers::style::AnswerResponse;
use crate::llm::extract::extract_object;
use crate::llm::generate_content;
use crate::prompts::load_prompt;

const DEFAULT_EXPLAIN_PROMPT: &str = "Explain the text below in simple, everyday language. \
Return a JSON object with an \"explanation\" field.";

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub text: String,
}

/// POST /explain — plain-language explanation of arbitrary text.
pub async fn explain_simply(
    Json(request): Json<ExplainRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidRequest("text must not be empty".to_string()));
    }

    let prompt = load_prompt("explain", DEFAULT_EXPLAIN_PROMPT);
    let user_content = format!("{prompt}\n\nText:\n{text}");

    let completion = generate_content(&user_content, &[]).await?;
    if completion.trim().is_empty() {
        return Err(ApiError::EmptyCompletion);
    }

    let answer = extract_object(&completion)?;
    Ok(Json(AnswerResponse { answer }))
}
