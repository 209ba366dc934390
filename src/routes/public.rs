use crate::{AppState, handlers, pages};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The request guard still sees every
/// one of these requests: a signed-in visitor opening an auth page is
/// redirected to their landing page before any handler here runs.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated probe for monitors and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page linking into the auth flow.
        .route("/", get(pages::home))
        // GET /login, /register
        // Credential and registration forms. Auth pages: a live session is
        // bounced away by the guard.
        .route("/login", get(pages::login_page))
        .route("/register", get(pages::register_page))
        // GET /verify-email
        // Post-registration notice; the confirmation email comes from the
        // hosted backend.
        .route("/verify-email", get(pages::verify_email_page))
        // POST /api/auth/login
        // Credential check against the external backend; sets the session
        // cookie and returns the role-computed redirect target.
        .route("/api/auth/login", post(handlers::login))
        // POST /api/auth/logout
        // Revokes the session at the backend and clears the cookie.
        // Idempotent when no session is present.
        .route("/api/auth/logout", post(handlers::logout))
        // POST /api/auth/register
        // Creates the identity (confirmation deferred) plus its companion
        // profile record.
        .route("/api/auth/register", post(handlers::register))
}
