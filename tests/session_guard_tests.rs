use async_trait::async_trait;
use auth_portal::{
    AppState,
    auth::CurrentUser,
    backend::{AuthBackend, SignedIn, access_token_from_cookies},
    config::AppConfig,
    create_router,
    error::BackendError,
    models::{Identity, Profile, Role, Session, UpdateProfileRequest},
};
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use chrono::Utc;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// --- Mock Backend for Session Logic ---

// Returns the configured session whenever the request carries a session
// cookie, and the configured role for any user id.
struct MockSessionBackend {
    session_to_return: Session,
    role_to_return: Option<Role>,
}

impl Default for MockSessionBackend {
    fn default() -> Self {
        MockSessionBackend {
            session_to_return: Session::anonymous(),
            role_to_return: None,
        }
    }
}

#[async_trait]
impl AuthBackend for MockSessionBackend {
    async fn get_session(&self, cookie_header: Option<&str>) -> Session {
        if access_token_from_cookies(cookie_header).is_some() {
            self.session_to_return.clone()
        } else {
            Session::anonymous()
        }
    }

    async fn get_role(&self, _user_id: Uuid) -> Option<Role> {
        self.role_to_return
    }

    // The guard and extractor never reach these.
    async fn sign_in(&self, _email: &str, _password: &str) -> Result<SignedIn, BackendError> {
        Err(BackendError::InvalidCredentials)
    }
    async fn sign_out(&self, _cookie_header: Option<&str>) -> Result<(), BackendError> {
        Ok(())
    }
    async fn create_identity(
        &self,
        _email: &str,
        _password: &str,
        _defer_confirmation: bool,
        _role: Role,
    ) -> Result<Identity, BackendError> {
        Err(BackendError::Response("not under test".to_string()))
    }
    async fn create_profile_record(&self, _user_id: Uuid, _role: Role) -> Result<(), BackendError> {
        Ok(())
    }
    async fn read_profile(&self, _user_id: Uuid) -> Result<Profile, BackendError> {
        Ok(Profile {
            user_id: TEST_USER_ID,
            ..Profile::default()
        })
    }
    async fn update_profile(
        &self,
        _user_id: Uuid,
        _fields: UpdateProfileRequest,
    ) -> Result<Profile, BackendError> {
        Ok(Profile::default())
    }
}

// --- Helper Functions ---

const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn test_identity() -> Identity {
    Identity {
        id: TEST_USER_ID,
        email: "signed-in@example.com".to_string(),
        created_at: Utc::now(),
        email_confirmed_at: None,
    }
}

fn signed_in_state(role: Option<Role>) -> AppState {
    AppState {
        backend: Arc::new(MockSessionBackend {
            session_to_return: Session::authenticated(test_identity()),
            role_to_return: role,
        }),
        config: AppConfig::default(),
    }
}

fn anonymous_state() -> AppState {
    AppState {
        backend: Arc::new(MockSessionBackend::default()),
        config: AppConfig::default(),
    }
}

/// Helper to get the mutable Parts struct from a generated Request.
fn get_request_parts(method: Method, uri: Uri, cookie: Option<&str>) -> Parts {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::empty()).unwrap();
    let (parts, _) = request.into_parts();
    parts
}

const SESSION_COOKIE: &str = "sb-access-token=valid-token";

/// Drives a GET through the full router (guard included) and returns the
/// response.
async fn get_through_router(
    state: AppState,
    path: &str,
    cookie: Option<&str>,
) -> axum::response::Response {
    let router = create_router(state);
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn location_of(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect response should carry a Location header")
}

// --- CurrentUser Extractor Tests ---

#[tokio::test]
async fn test_extractor_success_with_session_cookie() {
    let state = signed_in_state(None);
    let mut parts = get_request_parts(
        Method::GET,
        "/api/user/profile".parse().unwrap(),
        Some(SESSION_COOKIE),
    );

    let user = CurrentUser::from_request_parts(&mut parts, &state).await;

    let user = user.expect("a cookie-borne session should resolve");
    assert_eq!(user.identity.id, TEST_USER_ID);
    assert_eq!(user.identity.email, "signed-in@example.com");
}

#[tokio::test]
async fn test_extractor_rejects_missing_cookie() {
    let state = signed_in_state(None);
    let mut parts = get_request_parts(Method::GET, "/api/user/profile".parse().unwrap(), None);

    let user = CurrentUser::from_request_parts(&mut parts, &state).await;

    assert!(user.is_err());
}

#[tokio::test]
async fn test_extractor_rejects_cookie_the_backend_does_not_vouch_for() {
    // The backend resolves the token to no session even though a cookie is
    // present.
    let state = anonymous_state();
    let mut parts = get_request_parts(
        Method::GET,
        "/api/user/profile".parse().unwrap(),
        Some(SESSION_COOKIE),
    );

    let user = CurrentUser::from_request_parts(&mut parts, &state).await;

    assert!(user.is_err());
}

// --- Request Guard Tests (through the real router) ---

#[tokio::test]
async fn test_guard_redirects_anonymous_visitor_off_protected_pages() {
    for path in ["/profile", "/dashboard"] {
        let response = get_through_router(anonymous_state(), path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {path}");
        assert_eq!(location_of(&response), "/login");
    }
}

#[tokio::test]
async fn test_guard_redirects_signed_in_visitor_off_auth_pages_by_role() {
    for (role, target) in [
        (Some(Role::Admin), "/dashboard"),
        (Some(Role::Author), "/dashboard"),
        (Some(Role::User), "/profile"),
        (None, "/profile"),
    ] {
        let response =
            get_through_router(signed_in_state(role), "/login", Some(SESSION_COOKIE)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "role {role:?}");
        assert_eq!(location_of(&response), target, "role {role:?}");
    }
}

#[tokio::test]
async fn test_guard_keeps_plain_users_off_the_dashboard() {
    let response = get_through_router(
        signed_in_state(Some(Role::User)),
        "/dashboard",
        Some(SESSION_COOKIE),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&response), "/profile");
}

#[tokio::test]
async fn test_guard_admits_authors_to_the_dashboard() {
    let response = get_through_router(
        signed_in_state(Some(Role::Author)),
        "/dashboard",
        Some(SESSION_COOKIE),
    )
    .await;

    // The guard allows the request and the page renders.
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guard_waves_anonymous_visitors_through_public_pages() {
    for path in ["/", "/login", "/register", "/verify-email", "/health"] {
        let response = get_through_router(anonymous_state(), path, None).await;
        assert_eq!(response.status(), StatusCode::OK, "path {path}");
    }
}

#[tokio::test]
async fn test_guard_leaves_api_authentication_to_the_extractor() {
    // API paths are unclassified for the guard: no redirect, but the
    // extractor answers 401.
    let response = get_through_router(anonymous_state(), "/api/user/profile", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_in_user_reaches_profile_page() {
    let response = get_through_router(
        signed_in_state(Some(Role::User)),
        "/profile",
        Some(SESSION_COOKIE),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}
