use crate::{AppState, handlers, pages};
use axum::{Router, routing::get};

/// Protected Router Module
///
/// Everything here assumes a live session. The pages are covered by the
/// request guard (anonymous visitors are redirected to /login before the
/// handler runs) and re-check on their own; the API routes enforce the
/// session through the `CurrentUser` extractor and answer 401 envelopes
/// instead of redirecting.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        // GET /profile
        // The signed-in user's profile view.
        .route("/profile", get(pages::profile_page))
        // GET /dashboard
        // Author/admin workspace. The guard additionally redirects signed-in
        // `user` roles back to /profile.
        .route("/dashboard", get(pages::dashboard_page))
        // GET/PUT /api/user/profile
        // Read and partially update the caller's profile record.
        .route(
            "/api/user/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
}
