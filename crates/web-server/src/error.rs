use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine::EngineError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Engine(EngineError::NoDataAvailable(_)) => StatusCode::NOT_FOUND,
            AppError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::Engine(EngineError::NoDataAvailable(cause)) => {
                tracing::warn!(%cause, "Snapshot request produced no data.");
                format!("No data available: {}", cause)
            }
            AppError::Engine(engine_err) => {
                tracing::error!(error = ?engine_err, "Engine error.");
                "An error occurred while computing the snapshot".to_string()
            }
            AppError::BadRequest(message) => message,
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
