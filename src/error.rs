use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ApiResponse;

/// BackendError
///
/// Failures surfaced by the hosted backend capability layer. The variants
/// separate the outcomes the handlers map differently: a credential
/// rejection, a request the backend refused with a reason, and everything
/// else (network failures, unparseable responses) that surfaces as a generic
/// server error.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Sign-in rejected. Deliberately carries no detail: the client-facing
    /// message must not distinguish an unknown account from a wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend refused the request and said why (duplicate email, weak
    /// password, malformed field). The message is safe to relay.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// The HTTP call to the backend itself failed.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The backend answered with something this crate could not interpret.
    #[error("unexpected backend response: {0}")]
    Response(String),
}

/// ApiError
///
/// The error half of every API route. Each variant pins a status code and a
/// client-visible message; `IntoResponse` renders the uniform envelope.
/// Internal detail never reaches the client: 500s log the underlying error
/// server-side and answer with a generic line.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required field is missing or empty. 400.
    #[error("{0}")]
    Validation(&'static str),

    /// Bad credentials. 401 with a fixed generic message so the response
    /// cannot be used to probe which accounts exist.
    #[error("invalid email or password")]
    Authentication,

    /// No live session on a session-requiring API route. 401.
    #[error("unauthorized")]
    Unauthorized,

    /// The backend refused the request with a relayable reason. 400.
    #[error("{0}")]
    Rejected(String),

    /// Any other backend failure. 500, generic message, original error in
    /// the server log only.
    #[error("internal server error, please try again later")]
    Backend(#[source] BackendError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Authentication | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Backend(ref source) = self {
            tracing::error!(error = %source, "backend call failed");
        }

        let body = ApiResponse::failure(self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
