use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::commerce::CommerceError;
use crate::llm::extract::ExtractError;

/// Everything a request handler can fail with, mapped to a transport status
/// at the boundary. Client mistakes are 4xx; upstream APIs misbehaving are
/// 502 so the frontend can tell them apart from our own bugs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("model returned empty text")]
    EmptyCompletion,
    #[error("model output did not contain usable JSON: {0}")]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Commerce(#[from] CommerceError),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::EmptyCompletion
            | ApiError::Extract(_)
            | ApiError::Commerce(_)
            | ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!("Request failed with {status}: {self}");
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_mistakes_map_to_400() {
        let err = ApiError::InvalidRequest("missing image field".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn undecodable_images_map_to_422() {
        let decode_err = image::load_from_memory(&[0u8; 8]).unwrap_err();
        assert_eq!(
            ApiError::Image(decode_err).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn upstream_failures_map_to_502() {
        assert_eq!(
            ApiError::EmptyCompletion.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Extract(ExtractError::NoOpeningDelimiter('{')).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Commerce(CommerceError::MissingAccessToken).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
