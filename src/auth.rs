use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{backend::BackendState, error::ApiError, models::Identity};

/// CurrentUser Extractor Result
///
/// The resolved identity of an authenticated API request. Handlers take this
/// as an argument to require a live session; the id keys every profile
/// operation performed on the user's behalf.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
}

/// CurrentUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making CurrentUser usable as a
/// function argument in any session-requiring handler. Verification is fully
/// delegated: the request's Cookie header goes to the hosted backend's
/// session resolver, and whatever identity it vouches for is what handlers
/// see. No token is ever decoded locally.
///
/// Rejection: a 401 envelope when the cookies resolve to no session.
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    // Allows the extractor to pull the backend handle from the app state.
    BackendState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let backend = BackendState::from_ref(state);

        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok());

        let session = backend.get_session(cookie_header).await;

        match session.identity {
            Some(identity) => Ok(CurrentUser { identity }),
            None => Err(ApiError::Unauthorized),
        }
    }
}
