use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by services and handlers.
///
/// Every variant renders as `{"errors": ...}`, the body shape the storefront
/// client reads failure messages from.
#[derive(Debug, Error)]
pub enum AppError {
    /// Field-level validation failures, reported together.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate account or purchase. Reported as 400 to match the client.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment error: {0}")]
    Payment(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn client_message(&self) -> serde_json::Value {
        match self {
            AppError::Validation(messages) => json!(messages),
            AppError::InvalidRequest(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Payment(msg)
            | AppError::Upload(msg) => json!(msg),
            AppError::Database(_) | AppError::Internal(_) => json!("Internal server error"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidRequest(_)
            | AppError::AlreadyExists(_)
            | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Payment(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("❌ {}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({ "errors": self.client_message() }))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::Database(format!("Failed to encode document: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn validation_errors_are_listed() {
        let (status, body) = body_of(AppError::Validation(vec![
            "FirstName must be at least 3 characters long".to_string(),
            "Password must be at least 6 characters long".to_string(),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_rt::test]
    async fn duplicate_purchase_is_a_bad_request() {
        let (status, body) =
            body_of(AppError::AlreadyExists("User has already purchased this course".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"], "User has already purchased this course");
    }

    #[actix_rt::test]
    async fn database_details_are_not_leaked() {
        let (status, body) = body_of(AppError::Database("connection reset by 10.0.0.4".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errors"], "Internal server error");
    }
}
