use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    status_code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

/// `{statusCode, message, data?}` body whose HTTP status matches `statusCode`.
#[derive(Debug)]
pub(crate) struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn ok(message: impl Into<String>, data: T) -> Self {
        Self { status: StatusCode::OK, message: message.into(), data: Some(data) }
    }

    pub(crate) fn created(message: impl Into<String>, data: T) -> Self {
        Self { status: StatusCode::CREATED, message: message.into(), data: Some(data) }
    }

    pub(crate) fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), data: None }
    }

    pub(crate) fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body =
            Envelope { status_code: self.status.as_u16(), message: self.message, data: self.data };
        (self.status, Json(body)).into_response()
    }
}
