use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::ports::link_store::StoreError;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    MethodNotAllowed,
    Store(StoreError),
    /// Gist proxy failures keep GitHub's 401/403 status.
    Proxy(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Proxy(StoreError::Auth { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Store(err) | ApiError::Proxy(err) => match err {
                StoreError::Validation(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::MethodNotAllowed => "Method not allowed".into(),
            ApiError::Store(err) | ApiError::Proxy(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %error, "request_failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %error, "request_rejected");
        }
        (status, Json(ErrorBody { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status() {
        let auth = || StoreError::Auth {
            status: 403,
            message: "x".into(),
        };
        assert_eq!(ApiError::from(auth()).status().as_u16(), 500);
        assert_eq!(ApiError::Proxy(auth()).status().as_u16(), 403);

        let cases = [
            (StoreError::Validation("x".into()), 400),
            (StoreError::NotFound("x".into()), 404),
            (StoreError::Configuration("x".into()), 500),
            (StoreError::backend("failed", 502, "bad gateway"), 500),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status().as_u16(), expected);
        }
    }

    #[test]
    fn message_is_the_error_display() {
        let err = ApiError::from(StoreError::backend("failed to fetch links", 503, "down"));
        assert_eq!(err.message(), "failed to fetch links: 503 - down");
        assert_eq!(ApiError::MethodNotAllowed.message(), "Method not allowed");
    }
}
