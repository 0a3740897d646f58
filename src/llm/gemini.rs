use std::time::Duration;

use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::CONFIG;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_upstream_timing;

const GEMINI_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// An image to inline into the request payload as base64 data.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

// Non-text parts (inlineData etc.) deserialize with `text: None` and are
// skipped when collecting the completion.
#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .or_else(|| value.get("message").and_then(|v| v.as_str()))
        {
            return message.to_string();
        }
        return truncate_for_log(&value.to_string(), 2000);
    }

    truncate_for_log(trimmed, 2000)
}

fn build_parts(prompt: &str, images: &[InlineImage]) -> Vec<Value> {
    let mut parts = vec![json!({ "text": prompt })];
    for image in images {
        parts.push(json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": general_purpose::STANDARD.encode(&image.bytes)
            }
        }));
    }
    parts
}

fn collect_text(response: GeminiResponse) -> String {
    let mut out = String::new();
    for candidate in response.candidates.unwrap_or_default() {
        let parts = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default();
        for part in parts {
            if let Some(text) = part.text {
                out.push_str(&text);
            }
        }
    }
    out
}

/// Send a prompt (plus any inline images) to the configured Gemini model and
/// return the concatenated text of the completion. The text is raw model
/// output; callers pull structured data out of it with [`crate::llm::extract`].
pub async fn generate_content(prompt: &str, images: &[InlineImage]) -> Result<String> {
    let payload = json!({
        "contents": [{
            "role": "user",
            "parts": build_parts(prompt, images)
        }],
        "generationConfig": {
            "temperature": CONFIG.gemini_temperature,
            "topK": CONFIG.gemini_top_k,
            "topP": CONFIG.gemini_top_p,
            "maxOutputTokens": CONFIG.gemini_max_output_tokens,
        }
    });

    let operation = if images.is_empty() {
        "generate_text"
    } else {
        "generate_vision"
    };
    let metadata = json!({
        "promptChars": prompt.chars().count(),
        "imageParts": images.len(),
    });

    log_upstream_timing(
        "gemini",
        &CONFIG.gemini_model,
        operation,
        Some(metadata),
        || call_gemini_api(payload),
    )
    .await
}

async fn call_gemini_api(payload: Value) -> Result<String> {
    let client = get_http_client();
    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
        CONFIG.gemini_model, CONFIG.gemini_api_key
    );

    debug!(
        target: "llm.gemini",
        model = %CONFIG.gemini_model,
        parts = payload
            .pointer("/contents/0/parts")
            .and_then(|v| v.as_array())
            .map(|parts| parts.len())
            .unwrap_or(0),
        "Sending generateContent request"
    );

    let response = client
        .post(&url)
        .timeout(GEMINI_REQUEST_TIMEOUT)
        .json(&payload)
        .send()
        .await
        .map_err(|err| anyhow!("Gemini request failed: {}", redact_api_key(&err.to_string())))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = redact_api_key(&summarize_error_body(&body));
        return Err(anyhow!("Gemini API error: status={status}, detail={detail}"));
    }

    let parsed = response.json::<GeminiResponse>().await?;
    let text = collect_text(parsed);
    debug!(
        target: "llm.gemini",
        "Received completion: {}",
        truncate_for_log(&text, 200)
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_text_across_parts_and_skips_inline_data() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "{\"style\":" },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                        { "text": " \"casual\"}" }
                    ]
                }
            }]
        });
        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(collect_text(response), "{\"style\": \"casual\"}");
    }

    #[test]
    fn empty_candidates_collect_to_empty_string() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(collect_text(response), "");
    }

    #[test]
    fn summarizes_structured_error_bodies() {
        let body = "{\"error\": {\"message\": \"quota exceeded\"}}";
        assert_eq!(summarize_error_body(body), "quota exceeded");
    }

    #[test]
    fn builds_text_then_image_parts() {
        let images = [InlineImage {
            bytes: vec![1, 2, 3],
            mime_type: "image/jpeg".to_string(),
        }];
        let parts = build_parts("describe", &images);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], json!({ "text": "describe" }));
        assert_eq!(
            parts[1].pointer("/inlineData/mimeType").and_then(|v| v.as_str()),
            Some("image/jpeg")
        );
    }
}
