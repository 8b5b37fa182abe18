// ⚠️ Error kinds - every failure is scoped to a single submission

use crate::schema::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptError {
    /// Malformed input field; the request is rejected, nothing is stored
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// A semantically identical receipt was already accepted
    #[error("This receipt has already been processed")]
    Duplicate,

    /// A receipt that passed validation still failed to parse while scoring
    #[error("failed to calculate points: unparseable {field} {value:?}")]
    Scoring { field: &'static str, value: String },

    #[error("Receipt not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ReceiptError {
    pub fn scoring(field: &'static str, value: impl Into<String>) -> Self {
        ReceiptError::Scoring {
            field,
            value: value.into(),
        }
    }

    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ReceiptError::Validation(_) => "validation",
            ReceiptError::Duplicate => "duplicate",
            ReceiptError::Scoring { .. } => "scoring",
            ReceiptError::NotFound(_) => "not_found",
            ReceiptError::Storage(_) => "storage",
        }
    }
}

impl From<rusqlite::Error> for ReceiptError {
    fn from(err: rusqlite::Error) -> Self {
        ReceiptError::Storage(err.to_string())
    }
}

pub type Result<T, E = ReceiptError> = std::result::Result<T, E>;

// ============================================================================
// HTTP mapping (server feature)
// ============================================================================

#[cfg(feature = "server")]
mod http {
    use super::ReceiptError;
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;

    impl ReceiptError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                ReceiptError::Validation(_) => StatusCode::BAD_REQUEST,
                ReceiptError::Duplicate => StatusCode::CONFLICT,
                ReceiptError::NotFound(_) => StatusCode::NOT_FOUND,
                ReceiptError::Scoring { .. } | ReceiptError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }

        /// Message exposed to clients; internal details stay in the logs
        fn public_message(&self) -> String {
            match self {
                ReceiptError::NotFound(_) => "Receipt not found".to_string(),
                ReceiptError::Scoring { .. } => "Failed to calculate points".to_string(),
                ReceiptError::Storage(_) => "Failed to save receipt".to_string(),
                other => other.to_string(),
            }
        }
    }

    impl IntoResponse for ReceiptError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let body = Json(json!({ "error": self.public_message() }));

            (status, body).into_response()
        }
    }
}
