use crate::hrv::HrvNotFound;
use crate::models::ErrorBody;
use crate::sleep::NotFound;
use crate::vendor::AuthError;
use axum::{Json, http::StatusCode};

pub const NOT_CONNECTED: &str = "Garmin not connected";
pub const LOGIN_FAILED: &str = "Garmin login failed";
pub const MISSING_DEFAULT_CREDENTIALS: &str = "Missing GARMIN_EMAIL or GARMIN_PASSWORD";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub candidates: Option<Vec<String>>,
}

impl AppError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            candidates: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn not_connected() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, NOT_CONNECTED)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<AuthError> for AppError {
    fn from(_: AuthError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, LOGIN_FAILED)
    }
}

impl From<NotFound> for AppError {
    fn from(err: NotFound) -> Self {
        Self::new(StatusCode::NOT_FOUND, err.to_string())
    }
}

impl From<HrvNotFound> for AppError {
    fn from(err: HrvNotFound) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: err.to_string(),
            candidates: Some(err.candidates),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorBody {
            error: self.message,
            candidates: self.candidates,
        };
        (self.status, Json(body)).into_response()
    }
}
