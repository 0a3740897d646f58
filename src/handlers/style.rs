use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::CONFIG;
use crate::handlers::error::ApiError;
use crate::llm::extract::extract_object;
use crate::llm::media::{compress_image, detect_mime_type};
use crate::llm::{generate_content, InlineImage};
use crate::prompts::load_prompt;

const DEFAULT_EVAL_STYLE_PROMPT: &str = "Identify the style of dress of the person in the \
image. Return a JSON object with the style name and a description.";

/// Response wrapper shared by the endpoints that return a model-produced
/// JSON object verbatim.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: Value,
}

/// POST /eval-style — multipart `image` file plus optional `prompt` override.
pub async fn eval_style(mut multipart: Multipart) -> Result<Json<AnswerResponse>, ApiError> {
    let mut upload: Option<(Vec<u8>, String)> = None;
    let mut prompt_override: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::InvalidRequest(format!("invalid multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let declared = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| {
                        ApiError::InvalidRequest(format!("failed to read image field: {err}"))
                    })?
                    .to_vec();
                let mime = declared
                    .or_else(|| detect_mime_type(&bytes))
                    .ok_or_else(|| {
                        ApiError::InvalidRequest("image field carries no content type".to_string())
                    })?;
                if !mime.starts_with("image/") {
                    return Err(ApiError::InvalidRequest(format!(
                        "unsupported content type {mime}"
                    )));
                }
                upload = Some((bytes, mime));
            }
            "prompt" => {
                let text = field.text().await.map_err(|err| {
                    ApiError::InvalidRequest(format!("failed to read prompt field: {err}"))
                })?;
                if !text.trim().is_empty() {
                    prompt_override = Some(text);
                }
            }
            _ => {}
        }
    }

    let (bytes, mime) =
        upload.ok_or_else(|| ApiError::InvalidRequest("missing image field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::InvalidRequest("image field is empty".to_string()));
    }

    let prompt =
        prompt_override.unwrap_or_else(|| load_prompt("eval-style", DEFAULT_EVAL_STYLE_PROMPT));

    let (bytes, mime) = compress_image(bytes, &mime, CONFIG.max_image_bytes, CONFIG.max_image_dimension)?;
    info!("Evaluating style from {} byte {mime} upload", bytes.len());

    let completion = generate_content(
        &prompt,
        &[InlineImage {
            bytes,
            mime_type: mime,
        }],
    )
    .await?;
    if completion.trim().is_empty() {
        return Err(ApiError::EmptyCompletion);
    }

    let answer = extract_object(&completion)?;
    Ok(Json(AnswerResponse { answer }))
}
