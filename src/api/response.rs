//! Error responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::error::CheckinError;

impl IntoResponse for CheckinError {
    fn into_response(self) -> Response {
        let status = match &self {
            CheckinError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for CheckinError {
    fn from(rejection: JsonRejection) -> Self {
        CheckinError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for CheckinError {
    fn from(rejection: QueryRejection) -> Self {
        CheckinError::InvalidInput(rejection.body_text())
    }
}
