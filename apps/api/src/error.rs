use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use picsearch_core::AppError;
use serde::Serialize;
use tracing::{debug, error};
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Corruption(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.0.is_expected() {
            debug!(%status, error = %self.0, "request rejected");
        } else {
            error!(%status, error = %self.0, "request failed");
        }

        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use picsearch_core::AppError;

    use super::ApiError;

    #[test]
    fn store_failures_map_to_distinct_statuses() {
        let cases = [
            (AppError::Validation("x".to_owned()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized("x".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::RateLimited("x".to_owned()), StatusCode::TOO_MANY_REQUESTS),
            (AppError::Unavailable("x".to_owned()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Timeout("x".to_owned()), StatusCode::GATEWAY_TIMEOUT),
            (AppError::Corruption("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Upstream("x".to_owned()), StatusCode::BAD_GATEWAY),
            (AppError::Internal("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }
}
