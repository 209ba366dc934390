use crate::models::{Role, Session};

// --- Page Classification Constants ---

/// Path prefixes for the authentication pages (login, registration, email
/// verification). A signed-in user has no business on these pages and is
/// redirected to their landing page instead.
const AUTH_PAGE_PREFIXES: [&str; 3] = ["/login", "/register", "/verify-email"];

/// Path prefixes for pages that require a live session.
const PROTECTED_PAGE_PREFIXES: [&str; 2] = ["/profile", "/dashboard"];

/// The dashboard subtree. A subset of the protected pages, additionally
/// restricted to roles that can access the dashboard.
const DASHBOARD_PREFIX: &str = "/dashboard";

// Redirect targets used by the decision rules.
pub const LOGIN_PAGE: &str = "/login";
pub const PROFILE_PAGE: &str = "/profile";
pub const DASHBOARD_PAGE: &str = "/dashboard";

/// Returns true for paths under the authentication pages.
pub fn is_auth_page(path: &str) -> bool {
    AUTH_PAGE_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Returns true for paths that require a live session.
pub fn is_protected_page(path: &str) -> bool {
    PROTECTED_PAGE_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Returns true for paths under the dashboard subtree.
pub fn is_dashboard_page(path: &str) -> bool {
    path.starts_with(DASHBOARD_PREFIX)
}

// --- Decision ---

/// Decision
///
/// The outcome of evaluating a request path against the current session.
/// Either the request proceeds untouched, or the client is redirected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectTo(&'static str),
}

/// landing_page
///
/// The page a signed-in user belongs on: the dashboard for roles that can
/// access it, the profile page for everyone else. An absent role (no profile
/// row, or a failed lookup) lands on the lower-privilege page.
///
/// This is the single implementation of the role-based redirect target; the
/// request guard and the login handler both call it.
pub fn landing_page(role: Option<Role>) -> &'static str {
    match role {
        Some(role) if role.can_access_dashboard() => DASHBOARD_PAGE,
        _ => PROFILE_PAGE,
    }
}

/// needs_role
///
/// True when evaluating `decide` for this path and session would actually
/// consult the role. Callers use this to skip the role lookup on requests the
/// engine will wave through anyway.
pub fn needs_role(path: &str, session: &Session) -> bool {
    session.is_authenticated() && (is_auth_page(path) || is_dashboard_page(path))
}

/// decide
///
/// The access decision for one request. Pure: identical inputs always yield
/// the identical decision, and nothing is consulted beyond the arguments.
/// Rules are evaluated in order; the first match wins.
///
/// 1. A protected page without a session goes to the login page.
/// 2. An auth page with a live session goes to the user's landing page.
/// 3. The dashboard with a live session but without a dashboard-capable role
///    goes to the profile page.
/// 4. Everything else proceeds.
pub fn decide(path: &str, session: &Session, role: Option<Role>) -> Decision {
    let authenticated = session.is_authenticated();

    if is_protected_page(path) && !authenticated {
        return Decision::RedirectTo(LOGIN_PAGE);
    }

    if is_auth_page(path) && authenticated {
        return Decision::RedirectTo(landing_page(role));
    }

    if is_dashboard_page(path)
        && authenticated
        && !role.is_some_and(Role::can_access_dashboard)
    {
        return Decision::RedirectTo(PROFILE_PAGE);
    }

    Decision::Allow
}
