use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod access;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;

// Module for routing segregation (Public, Protected).
pub mod routes;
use access::Decision;
use routes::{protected, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry
// point (main.rs).
pub use backend::{AuthBackend, BackendState, SupabaseBackend};
pub use config::AppConfig;

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the API
/// surface. It aggregates the handlers and schemas decorated with the
/// `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros. The resulting
/// JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::register,
        handlers::get_profile, handlers::update_profile
    ),
    components(
        schemas(
            models::Role, models::Identity, models::Profile,
            models::LoginRequest, models::RegisterRequest, models::UpdateProfileRequest,
            models::LoginData, models::RegisterData, models::ProfileData,
        )
    ),
    tags(
        (name = "auth-portal", description = "Authentication & Profile API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: the single, thread-safe,
/// immutable container holding the backend handle and configuration, shared
/// across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Capability layer for every call to the hosted auth/database backend.
    pub backend: BackendState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors to selectively pull components from
// the shared AppState.

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// access_guard
///
/// The request guard every inbound request passes through before reaching a
/// handler or page. It resolves the session from the request cookies, looks
/// up the role only when a rule will actually consult it, and acts on the
/// engine's decision: forward the request, or answer with a redirect.
///
/// API paths classify as neither auth nor protected pages, so they always
/// pass through here; their session enforcement is the `CurrentUser`
/// extractor's job.
async fn access_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());

    let session = state.backend.get_session(cookie_header).await;
    let path = request.uri().path().to_owned();

    // The role lookup is deferred: plain allowed requests never trigger it.
    let role = match (&session.identity, access::needs_role(&path, &session)) {
        (Some(identity), true) => state.backend.get_role(identity.id).await,
        _ => None,
    };

    match access::decide(&path, &session, role) {
        Decision::Allow => next.run(request).await,
        Decision::RedirectTo(target) => Redirect::to(target).into_response(),
    }
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Page and API routes, segregated by access class.
        .merge(public::public_routes())
        .merge(protected::protected_routes())
        // The request guard runs for every route above: pages get their
        // redirects, everything else is waved through.
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in
                // a span correlated by the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns x-request-id to the
                // client and injects it into downstream service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (Applied last)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: includes the
/// `x-request-id` header (if present) alongside the HTTP method and URI so
/// every log line of a request is correlated by one id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
