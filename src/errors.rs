use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::etherscan::ClientError;

/// Failures raised by the whale analysis and discovery engines.
#[derive(Debug, thiserror::Error)]
pub enum WhaleError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("error analyzing whale {address}: {source}")]
    Analysis {
        address: String,
        #[source]
        source: ClientError,
    },
}

impl WhaleError {
    pub fn analysis(address: &str) -> impl Fn(ClientError) -> WhaleError + '_ {
        move |source| WhaleError::Analysis {
            address: address.to_string(),
            source,
        }
    }
}

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_error_names_address_and_cause() {
        let err = WhaleError::analysis("0xabc")(ClientError::Upstream {
            message: "NOTOK".into(),
            result: json!("Invalid address format"),
        });
        let text = err.to_string();
        assert!(text.contains("0xabc"));
        assert!(text.contains("NOTOK"));
    }

    #[test]
    fn test_app_error_status() {
        let resp = AppError::NotFound("tool".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = AppError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let resp = AppError::BadRequest("args".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
