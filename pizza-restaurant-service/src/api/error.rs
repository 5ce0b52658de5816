use axum::{http::StatusCode, response::Json};
use serde_json::json;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Pizza or Restaurant not found")]
    ReferenceNotFound,
    #[error("Invalid input")]
    InvalidInput,
    #[error("{0}")]
    Validation(String),
    /// Reported with a `message` key rather than `error`; clients rely on it.
    #[error("No pizzas found")]
    NoPizzas,
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("Worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RestaurantNotFound => ApiError::RestaurantNotFound,
            StoreError::ReferenceNotFound => ApiError::ReferenceNotFound,
            StoreError::Validation(e) => ApiError::Validation(e.to_string()),
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, key) = match &self {
            ApiError::RestaurantNotFound | ApiError::ReferenceNotFound => {
                (StatusCode::NOT_FOUND, "error")
            }
            ApiError::InvalidInput | ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "error"),
            ApiError::NoPizzas => (StatusCode::NOT_FOUND, "message"),
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Task(_) => {
                error!(error = %self, "request failed");
                let body = Json(json!({ "error": "Internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let mut body = serde_json::Map::new();
        body.insert(key.to_string(), self.to_string().into());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use serde_json::Value;

    use super::*;
    use crate::models::ValidationError;

    async fn render(e: ApiError) -> (StatusCode, Value) {
        let response = e.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_bodies() {
        assert_eq!(
            render(ApiError::RestaurantNotFound).await,
            (StatusCode::NOT_FOUND, json!({"error": "Restaurant not found"}))
        );
        assert_eq!(
            render(ApiError::ReferenceNotFound).await,
            (
                StatusCode::NOT_FOUND,
                json!({"error": "Pizza or Restaurant not found"})
            )
        );
        assert_eq!(
            render(ApiError::InvalidInput).await,
            (StatusCode::BAD_REQUEST, json!({"error": "Invalid input"}))
        );
        assert_eq!(
            render(ApiError::NoPizzas).await,
            (StatusCode::NOT_FOUND, json!({"message": "No pizzas found"}))
        );
        assert_eq!(
            render(StoreError::Validation(ValidationError::PriceOutOfRange).into()).await,
            (
                StatusCode::BAD_REQUEST,
                json!({"error": "Price must be between 1 and 30"})
            )
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_opaque() {
        assert_eq!(
            render(ApiError::Database(diesel::result::Error::BrokenTransactionManager)).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Internal server error"})
            )
        );
    }
}
