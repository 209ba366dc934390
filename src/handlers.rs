use crate::{
    AppState, access,
    auth::CurrentUser,
    backend::SESSION_COOKIE,
    error::{ApiError, BackendError},
    models::{
        ApiResponse, LoginData, LoginRequest, Profile, ProfileData, RegisterData, RegisterRequest,
        UpdateProfileRequest,
    },
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};

// --- Session Cookie Helpers ---

/// The Set-Cookie value carrying a fresh session token to the client.
fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// The Set-Cookie value that expires the session cookie.
fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// --- Handlers ---

/// login
///
/// [Public Route] Checks credentials against the external auth backend and
/// establishes the session cookie.
///
/// *Security*: a rejected sign-in answers 401 with one fixed message for
/// every cause. The response must not reveal whether the account exists.
///
/// On success the redirect target is computed from the stored role by the
/// same function the request guard uses, so the two can never disagree.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginData),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Bad credentials"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password are required"));
    }

    let signed_in = state
        .backend
        .sign_in(&payload.email, &payload.password)
        .await
        .map_err(|err| match err {
            BackendError::InvalidCredentials => ApiError::Authentication,
            other => ApiError::Backend(other),
        })?;

    let role = state.backend.get_role(signed_in.user.id).await;
    let redirect_to = access::landing_page(role).to_string();

    let body = ApiResponse::ok_with_message(
        LoginData {
            user: signed_in.user,
            redirect_to,
        },
        "signed in",
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&signed_in.access_token))],
        Json(body),
    )
        .into_response())
}

/// logout
///
/// [Public Route] Revokes the session at the backend and clears the session
/// cookie.
///
/// *Idempotency*: a request with no session cookie at all succeeds; signing
/// out twice is not an error.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 400, description = "Backend rejected the sign-out"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());

    state
        .backend
        .sign_out(cookie_header)
        .await
        .map_err(|err| match err {
            BackendError::Rejected(msg) => ApiError::Rejected(msg),
            other => ApiError::Backend(other),
        })?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ApiResponse::message_only("signed out")),
    )
        .into_response())
}

/// register
///
/// [Public Route] Creates a new identity via the external auth backend with
/// email confirmation deferred, then creates the companion profile record
/// carrying the requested role (default `user`).
///
/// A failed profile insert after a successful identity creation does not
/// fail the request: the identity exists without its profile row, the error
/// is visible in the server log only, and the client still receives 201.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterData),
        (status = 400, description = "Missing fields or backend validation"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterData>>), ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password are required"));
    }

    let role = payload.role.unwrap_or_default();

    let identity = state
        .backend
        .create_identity(&payload.email, &payload.password, true, role)
        .await
        .map_err(|err| match err {
            BackendError::Rejected(msg) => ApiError::Rejected(msg),
            other => ApiError::Backend(other),
        })?;

    if let Err(err) = state.backend.create_profile_record(identity.id, role).await {
        tracing::error!(user_id = %identity.id, "profile record creation failed: {err}");
    }

    let body = ApiResponse::ok_with_message(
        RegisterData { user_id: identity.id },
        "registration successful, check your inbox to verify your account",
    );

    Ok((StatusCode::CREATED, Json(body)))
}

/// get_profile
///
/// [Session Route] Returns the authenticated identity together with its
/// profile record.
#[utoipa::path(
    get,
    path = "/api/user/profile",
    responses(
        (status = 200, description = "Identity and profile", body = ProfileData),
        (status = 401, description = "No session"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn get_profile(
    CurrentUser { identity }: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileData>>, ApiError> {
    let profile = state
        .backend
        .read_profile(identity.id)
        .await
        .map_err(ApiError::Backend)?;

    Ok(Json(ApiResponse::ok(ProfileData {
        user: identity,
        profile,
    })))
}

/// update_profile
///
/// [Session Route] Overwrites the provided display fields of the caller's
/// profile. Fields absent from the body stay untouched; `updated_at` moves on
/// every successful update.
#[utoipa::path(
    put,
    path = "/api/user/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = Profile),
        (status = 401, description = "No session"),
        (status = 500, description = "Backend failure")
    )
)]
pub async fn update_profile(
    CurrentUser { identity }: CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = state
        .backend
        .update_profile(identity.id, payload)
        .await
        .map_err(ApiError::Backend)?;

    Ok(Json(ApiResponse::ok_with_message(profile, "profile updated")))
}
