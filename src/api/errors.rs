use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::api::response::ApiResponse;
use crate::services::errors::ExamError;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal,
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ExamError> for ApiError {
    fn from(error: ExamError) -> Self {
        let message = error.to_string();
        match error {
            ExamError::NotFound(_) => ApiError::NotFound(message),
            ExamError::Forbidden(_) | ExamError::NotEnrolled => ApiError::Forbidden(message),
            ExamError::AlreadyExists | ExamError::AlreadyAttempted => ApiError::Conflict(message),
            ExamError::Expired
            | ExamError::NotStarted
            | ExamError::Ended
            | ExamError::Invalid(_) => ApiError::BadRequest(message),
            ExamError::Storage(err) => ApiError::internal(err, "Storage operation failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Unauthorized(message) => message.to_string(),
            ApiError::Forbidden(message)
            | ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => message,
            ApiError::Internal => INTERNAL_MESSAGE.to_string(),
        };

        let mut response = ApiResponse::<()>::message(status, message).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::StoreError;
    use crate::test_support::read_json;

    #[tokio::test]
    async fn domain_errors_map_to_status_and_envelope() {
        let cases = [
            (ExamError::NotFound("Exam"), StatusCode::NOT_FOUND, "Exam not found"),
            (
                ExamError::NotEnrolled,
                StatusCode::FORBIDDEN,
                "You are not enrolled in this course",
            ),
            (
                ExamError::AlreadyAttempted,
                StatusCode::CONFLICT,
                "You have already attempted this exam",
            ),
            (ExamError::Expired, StatusCode::BAD_REQUEST, "Exam has ended"),
        ];

        for (error, status, message) in cases {
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), status);
            let json = read_json(response).await;
            assert_eq!(json["statusCode"], status.as_u16());
            assert_eq!(json["message"], message);
            assert!(json.get("data").is_none());
        }
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let response = ApiError::from(ExamError::Storage(StoreError::Unavailable)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = read_json(response).await;
        assert_eq!(json["message"], "Internal server error");
    }

    #[test]
    fn unauthorized_sets_bearer_challenge() {
        let response = ApiError::Unauthorized("Invalid authentication credentials").into_response();
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}
