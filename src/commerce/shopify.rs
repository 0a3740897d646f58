use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::CONFIG;
use crate::llm::extract::{extract_object, ExtractError};
use crate::utils::http::get_http_client;

const COMMERCE_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LOG_LIMIT: usize = 800;

#[derive(Debug, thiserror::Error)]
pub enum CommerceError {
    #[error("commerce request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("commerce API error: status={status}, detail={detail}")]
    Status { status: StatusCode, detail: String },
    #[error("commerce auth response did not contain an access token")]
    MissingAccessToken,
    #[error("commerce response did not contain result content text")]
    MissingContent,
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct McpResponse {
    result: Option<McpResult>,
}

#[derive(Debug, Deserialize)]
struct McpResult {
    content: Option<Vec<McpContent>>,
}

#[derive(Debug, Deserialize)]
struct McpContent {
    text: Option<String>,
}

/// The slice of an offer the frontend actually renders. Every field is
/// optional-with-default because offers routinely arrive with holes.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_name: Option<String>,
    pub shop_name: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

async fn error_detail(response: reqwest::Response) -> CommerceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    CommerceError::Status {
        status,
        detail: truncate_for_log(body.trim(), ERROR_BODY_LOG_LIMIT),
    }
}

async fn fetch_access_token() -> Result<String, CommerceError> {
    let client = get_http_client();
    let response = client
        .post(&CONFIG.shopify_auth_url)
        .timeout(COMMERCE_REQUEST_TIMEOUT)
        .json(&json!({
            "client_id": CONFIG.shopify_client_id,
            "client_secret": CONFIG.shopify_client_secret,
            "grant_type": "client_credentials",
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_detail(response).await);
    }

    let payload = response.json::<AccessTokenResponse>().await?;
    payload
        .access_token
        .filter(|token| !token.trim().is_empty())
        .ok_or(CommerceError::MissingAccessToken)
}

/// Search the saved product catalog and return minimal product summaries.
///
/// Authenticates with client credentials, issues the JSON-RPC tool call, and
/// extracts the JSON document embedded in the tool result text before
/// reshaping its offers.
pub async fn search_catalog(
    query: &str,
    context: &str,
    limit: u32,
) -> Result<Vec<ProductSummary>, CommerceError> {
    let token = fetch_access_token().await?;

    let payload = json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "id": 1,
        "params": {
            "name": "search_global_products",
            "arguments": {
                "query": query,
                "context": context,
                "limit": limit,
                "saved_catalog": CONFIG.shopify_saved_catalog,
            },
        },
    });

    debug!(
        target: "commerce.shopify",
        query = query,
        limit = limit,
        "Searching product catalog"
    );

    let client = get_http_client();
    let response = client
        .post(&CONFIG.shopify_mcp_url)
        .timeout(COMMERCE_REQUEST_TIMEOUT)
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(error_detail(response).await);
    }

    let parsed = response.json::<McpResponse>().await?;
    let text_blob = parsed
        .result
        .and_then(|result| result.content)
        .and_then(|content| content.into_iter().next())
        .and_then(|content| content.text)
        .ok_or(CommerceError::MissingContent)?;

    let offers_doc = extract_object(&text_blob)?;
    Ok(summarize_offers(&offers_doc))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reshape a parsed offers document into the minimal summaries the frontend
/// renders. Missing fields become `None`/empty rather than errors.
pub fn summarize_offers(parsed: &Value) -> Vec<ProductSummary> {
    let offers = parsed
        .get("offers")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut results = Vec::with_capacity(offers.len());
    for offer in offers {
        let product_name = offer
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);

        let price = offer.pointer("/priceRange/min").and_then(|min| {
            let amount = min.get("amount").and_then(scalar_to_string)?;
            let currency = min.get("currency").and_then(scalar_to_string)?;
            Some(format!("{amount} {currency}"))
        });

        let url = offer
            .get("lookupUrl")
            .and_then(Value::as_str)
            .map(str::to_string);

        let shop_name = offer
            .pointer("/variants/0/shop/name")
            .and_then(Value::as_str)
            .map(str::to_string);

        let mut colors = Vec::new();
        let mut sizes = Vec::new();
        let options = offer
            .get("options")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for option in options {
            let name = option
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            let values: Vec<String> = option
                .get("values")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| {
                            entry.get("value").and_then(Value::as_str).map(str::to_string)
                        })
                        .collect()
                })
                .unwrap_or_default();

            if name.contains("color") {
                colors = values;
            } else if name.contains("size") {
                sizes = values;
            }
        }

        results.push(ProductSummary {
            product_name,
            shop_name,
            price,
            url,
            colors,
            sizes,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_offers() -> Value {
        json!({
            "offers": [{
                "title": "Crewneck Sweater",
                "lookupUrl": "https://shop.example/products/crewneck",
                "priceRange": { "min": { "amount": "39.99", "currency": "USD" } },
                "variants": [{ "shop": { "name": "Example Shop" } }],
                "options": [
                    { "name": "Color", "values": [{ "value": "Navy" }, { "value": "Cream" }] },
                    { "name": "Size", "values": [{ "value": "S" }, { "value": "M" }, { "value": "L" }] }
                ]
            }]
        })
    }

    #[test]
    fn summarizes_a_complete_offer() {
        let products = summarize_offers(&sample_offers());
        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert_eq!(product.product_name.as_deref(), Some("Crewneck Sweater"));
        assert_eq!(product.shop_name.as_deref(), Some("Example Shop"));
        assert_eq!(product.price.as_deref(), Some("39.99 USD"));
        assert_eq!(
            product.url.as_deref(),
            Some("https://shop.example/products/crewneck")
        );
        assert_eq!(product.colors, vec!["Navy", "Cream"]);
        assert_eq!(product.sizes, vec!["S", "M", "L"]);
    }

    #[test]
    fn numeric_amounts_format_like_strings() {
        let doc = json!({
            "offers": [{
                "title": "Linen Shirt",
                "priceRange": { "min": { "amount": 25, "currency": "EUR" } }
            }]
        });
        let products = summarize_offers(&doc);
        assert_eq!(products[0].price.as_deref(), Some("25 EUR"));
    }

    #[test]
    fn missing_fields_become_none_or_empty() {
        let doc = json!({ "offers": [{}] });
        let products = summarize_offers(&doc);
        assert_eq!(products.len(), 1);
        let product = &products[0];
        assert!(product.product_name.is_none());
        assert!(product.shop_name.is_none());
        assert!(product.price.is_none());
        assert!(product.url.is_none());
        assert!(product.colors.is_empty());
        assert!(product.sizes.is_empty());
    }

    #[test]
    fn document_without_offers_yields_no_products() {
        assert!(summarize_offers(&json!({})).is_empty());
        assert!(summarize_offers(&json!({ "offers": "not a list" })).is_empty());
    }

    #[test]
    fn partial_price_is_dropped_entirely() {
        let doc = json!({
            "offers": [{ "priceRange": { "min": { "amount": "10.00" } } }]
        });
        assert!(summarize_offers(&doc)[0].price.is_none());
    }
}
