use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;

/// Process-wide configuration, read once from the environment at startup.
///
/// Request handlers never read env vars directly; everything external they
/// need flows through this struct.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub gemini_top_k: i32,
    pub gemini_top_p: f32,
    pub gemini_max_output_tokens: i32,
    pub shopify_client_id: String,
    pub shopify_client_secret: String,
    pub shopify_saved_catalog: String,
    pub shopify_auth_url: String,
    pub shopify_mcp_url: String,
    pub prompts_dir: PathBuf,
    pub max_image_bytes: usize,
    pub max_image_dimension: u32,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut missing = Vec::new();

        let gemini_api_key = env_string("GEMINI_API_KEY", "");
        if gemini_api_key.trim().is_empty() {
            missing.push("GEMINI_API_KEY");
        }

        let shopify_client_id = env_string("SHOPIFY_CATALOG_CLIENT_ID", "");
        if shopify_client_id.trim().is_empty() {
            missing.push("SHOPIFY_CATALOG_CLIENT_ID");
        }

        let shopify_client_secret = env_string("SHOPIFY_CATALOG_CLIENT_SECRET", "");
        if shopify_client_secret.trim().is_empty() {
            missing.push("SHOPIFY_CATALOG_CLIENT_SECRET");
        }

        let shopify_saved_catalog = env_string("SHOPIFY_SAVED_CATALOG_ID", "");
        if shopify_saved_catalog.trim().is_empty() {
            missing.push("SHOPIFY_SAVED_CATALOG_ID");
        }

        if !missing.is_empty() {
            return Err(anyhow!(
                "Missing required environment variables: {}",
                missing.join(", ")
            ));
        }

        Ok(Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            port: env_u16("PORT", 8000),
            gemini_api_key,
            gemini_model: env_string("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.7),
            gemini_top_k: env_i32("GEMINI_TOP_K", 40),
            gemini_top_p: env_f32("GEMINI_TOP_P", 0.95),
            gemini_max_output_tokens: env_i32("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            shopify_client_id,
            shopify_client_secret,
            shopify_saved_catalog,
            shopify_auth_url: env_string(
                "SHOPIFY_AUTH_URL",
                "https://api.shopify.com/auth/access_token",
            ),
            shopify_mcp_url: env_string(
                "SHOPIFY_MCP_URL",
                "https://discover.shopifyapps.com/global/mcp",
            ),
            prompts_dir: PathBuf::from(env_string("PROMPTS_DIR", "prompts")),
            max_image_bytes: env_usize("MAX_IMAGE_BYTES", 1024 * 1024),
            max_image_dimension: env_u32("MAX_IMAGE_DIMENSION", 1536),
        })
    }
}
