use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::service::ServiceError;

#[derive(Debug, Serialize)]
struct ProblemDetails {
    #[serde(rename = "type")]
    problem_type: &'static str,
    title: &'static str,
    detail: String,
}

/// `application/problem+json` body for failures the client cannot fix.
pub struct ProblemResponse {
    status: StatusCode,
    body: ProblemDetails,
}

impl ProblemResponse {
    pub fn new<S: Into<String>>(status: StatusCode, problem_type: &'static str, detail: S) -> Self {
        Self {
            status,
            body: ProblemDetails {
                problem_type,
                title: status.canonical_reason().unwrap_or("error"),
                detail: detail.into(),
            },
        }
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let mut response = Json(self.body).into_response();
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Client mistakes are answered in plain text; storage failures are logged
/// and reported as a problem document.
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "Todo Not Found").into_response(),
            Self::Storage(err) => {
                error!(stage = "storage", error = %err, "todo request failed");
                ProblemResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "failed to access todo storage",
                )
                .into_response()
            }
        }
    }
}
