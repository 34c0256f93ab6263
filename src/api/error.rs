//! HTTP error envelope and the mapping from cart failures to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::Error;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, "invalid_request", message) }
    pub fn unauthorized() -> Self { Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Sign in required") }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn code(&self) -> &'static str { self.code }
    pub fn message(&self) -> &str { &self.message }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let message = e.to_string();
        match e {
            Error::Validation(msg) => Self::invalid(msg),
            Error::InvalidWeightOption(_) => Self::new(StatusCode::BAD_REQUEST, "invalid_weight_option", message),
            Error::ProductNotFound => Self::new(StatusCode::NOT_FOUND, "product_not_found", message),
            Error::CartNotFound => Self::new(StatusCode::NOT_FOUND, "cart_not_found", message),
            Error::LineNotFound => Self::new(StatusCode::NOT_FOUND, "line_not_found", message),
            Error::GuestCartNotFound => Self::new(StatusCode::NOT_FOUND, "guest_cart_not_found", message),
            Error::InvalidProductPrice | Error::Storage(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = if self.status.is_server_error() {
            error!(code = self.code, error = %self.message, "request failed");
            "Internal server error"
        } else {
            self.message.as_str()
        };
        (self.status, Json(ErrorBody { code: self.code, message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[test]
    fn not_found_family_maps_to_404_with_distinct_codes() {
        let codes: Vec<_> = [Error::ProductNotFound, Error::CartNotFound, Error::LineNotFound, Error::GuestCartNotFound]
            .into_iter()
            .map(ApiError::from)
            .inspect(|e| assert_eq!(e.status(), StatusCode::NOT_FOUND))
            .map(|e| e.code())
            .collect();
        assert_eq!(codes, ["product_not_found", "cart_not_found", "line_not_found", "guest_cart_not_found"]);
    }

    #[test]
    fn storage_failures_are_internal() {
        let e = ApiError::from(Error::Storage(StoreError::Query("boom".into())));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code(), "internal_error");
    }

    #[test]
    fn validation_keeps_its_message() {
        let e = ApiError::from(Error::Validation("guestId must not be empty".into()));
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.message(), "guestId must not be empty");
    }
}
