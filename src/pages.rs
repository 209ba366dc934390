use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{AppState, access, models::Session};

/// Minimal server-rendered shell shared by every page. No client framework;
/// the interesting work happens in the API routes and the request guard.
fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

async fn resolve_session(state: &AppState, headers: &HeaderMap) -> Session {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok());
    state.backend.get_session(cookie_header).await
}

/// home
///
/// [Public Page] Entry page with links into the auth flow.
pub async fn home() -> Html<String> {
    layout(
        "Welcome",
        "<h1>Welcome</h1>\n\
         <p>Sign in to manage your profile, or create an account.</p>\n\
         <nav><a href=\"/login\">Sign in</a> | <a href=\"/register\">Register</a></nav>",
    )
}

/// login_page
///
/// [Public Page] Credential form posting JSON to the login API and following
/// the role-computed redirect target on success. The request guard bounces
/// already-signed-in visitors away before this handler runs.
pub async fn login_page() -> Html<String> {
    layout(
        "Sign in",
        "<h1>Sign in</h1>\n\
         <form id=\"login\">\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Sign in</button>\n\
         </form>\n\
         <p id=\"status\"></p>\n\
         <p><a href=\"/register\">Need an account? Register</a></p>\n\
         <script>\n\
         document.getElementById('login').addEventListener('submit', async (e) => {\n\
           e.preventDefault();\n\
           const form = new FormData(e.target);\n\
           const res = await fetch('/api/auth/login', {\n\
             method: 'POST',\n\
             headers: {'Content-Type': 'application/json'},\n\
             body: JSON.stringify(Object.fromEntries(form)),\n\
           });\n\
           const body = await res.json();\n\
           if (body.success) { window.location.href = body.data.redirect_to; }\n\
           else { document.getElementById('status').textContent = body.error; }\n\
         });\n\
         </script>",
    )
}

/// register_page
///
/// [Public Page] Registration form posting JSON to the register API.
pub async fn register_page() -> Html<String> {
    layout(
        "Register",
        "<h1>Create an account</h1>\n\
         <form id=\"register\">\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Register</button>\n\
         </form>\n\
         <p id=\"status\"></p>\n\
         <p><a href=\"/login\">Already registered? Sign in</a></p>\n\
         <script>\n\
         document.getElementById('register').addEventListener('submit', async (e) => {\n\
           e.preventDefault();\n\
           const form = new FormData(e.target);\n\
           const res = await fetch('/api/auth/register', {\n\
             method: 'POST',\n\
             headers: {'Content-Type': 'application/json'},\n\
             body: JSON.stringify(Object.fromEntries(form)),\n\
           });\n\
           const body = await res.json();\n\
           if (body.success) { window.location.href = '/verify-email'; }\n\
           else { document.getElementById('status').textContent = body.error; }\n\
         });\n\
         </script>",
    )
}

/// verify_email_page
///
/// [Public Page] Static notice shown after registration. The confirmation
/// email itself is sent by the hosted backend.
pub async fn verify_email_page() -> Html<String> {
    layout(
        "Verify your email",
        "<h1>Check your inbox</h1>\n\
         <p>We sent you a confirmation link. Verify your address, then\n\
         <a href=\"/login\">sign in</a>.</p>",
    )
}

/// profile_page
///
/// [Protected Page] The signed-in user's profile. The request guard already
/// redirects anonymous visitors, but the page re-resolves the session and
/// redirects on its own as well, so it stays correct even if mounted without
/// the guard.
pub async fn profile_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = resolve_session(&state, &headers).await;
    let Some(identity) = session.identity else {
        return Redirect::to(access::LOGIN_PAGE).into_response();
    };

    let profile = state.backend.read_profile(identity.id).await.ok();
    let (full_name, bio) = profile
        .as_ref()
        .map(|p| {
            (
                p.full_name.clone().unwrap_or_default(),
                p.bio.clone().unwrap_or_default(),
            )
        })
        .unwrap_or_default();

    layout(
        "Profile",
        &format!(
            "<h1>Profile</h1>\n\
             <dl>\n\
             <dt>Email</dt><dd>{}</dd>\n\
             <dt>Name</dt><dd>{}</dd>\n\
             <dt>Bio</dt><dd>{}</dd>\n\
             </dl>\n\
             <form method=\"post\" action=\"/api/auth/logout\">\
             <button type=\"submit\">Sign out</button></form>",
            identity.email, full_name, bio
        ),
    )
    .into_response()
}

/// dashboard_page
///
/// [Protected Page] The author/admin workspace. Re-checks both session and
/// role: a signed-in `user` lands back on the profile page, mirroring the
/// request guard's rule for the dashboard subtree.
pub async fn dashboard_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = resolve_session(&state, &headers).await;
    let Some(identity) = session.identity else {
        return Redirect::to(access::LOGIN_PAGE).into_response();
    };

    let role = state.backend.get_role(identity.id).await;
    if !role.is_some_and(crate::models::Role::can_access_dashboard) {
        return Redirect::to(access::PROFILE_PAGE).into_response();
    }

    layout(
        "Dashboard",
        &format!(
            "<h1>Author dashboard</h1>\n\
             <p>Signed in as {} ({})</p>\n\
             <dl>\n\
             <dt>User ID</dt><dd>{}</dd>\n\
             <dt>Member since</dt><dd>{}</dd>\n\
             </dl>\n\
             <form method=\"post\" action=\"/api/auth/logout\">\
             <button type=\"submit\">Sign out</button></form>",
            identity.email,
            role.map(|r| r.as_str()).unwrap_or("user"),
            identity.id,
            identity.created_at.format("%Y-%m-%d"),
        ),
    )
    .into_response()
}
