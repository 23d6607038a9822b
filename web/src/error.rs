use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use webhook_auth::{recommended_status, Error as WebhookAuthError, WebhookErrorKind};

use crate::controller::ApiResponse;

pub type Result<T> = core::result::Result<T, Error>;

/// A rejected webhook, rendered with the status recommended for its reason.
#[derive(Debug)]
pub struct Error(WebhookAuthError);

impl Error {
    pub fn reason(&self) -> WebhookErrorKind {
        self.0.reason()
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// Reason detail stays in the logs; bodies are generic
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(recommended_status(self.reason()))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match self.reason() {
            WebhookErrorKind::ConfigurationError => "INTERNAL SERVER ERROR",
            WebhookErrorKind::BodyReadError => "BAD REQUEST",
            _ => "UNAUTHORIZED",
        };
        (status, Json(ApiResponse::new(status.into(), message))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<WebhookAuthError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
