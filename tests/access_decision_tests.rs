use auth_portal::access::{self, Decision};
use auth_portal::models::{Identity, Role, Session};
use chrono::Utc;
use uuid::Uuid;

// --- Test Utilities ---

fn identity() -> Identity {
    Identity {
        id: Uuid::from_u128(1),
        email: "someone@example.com".to_string(),
        created_at: Utc::now(),
        email_confirmed_at: None,
    }
}

fn signed_in() -> Session {
    Session::authenticated(identity())
}

fn anonymous() -> Session {
    Session::anonymous()
}

// --- Rule 1: protected pages require a session ---

#[test]
fn protected_pages_without_session_redirect_to_login() {
    for path in ["/profile", "/dashboard", "/profile/edit", "/dashboard/posts/42"] {
        assert_eq!(
            access::decide(path, &anonymous(), None),
            Decision::RedirectTo("/login"),
            "path {path} should bounce anonymous visitors to the login page"
        );
    }
}

// --- Rule 2: auth pages route signed-in visitors by role ---

#[test]
fn auth_pages_with_session_route_dashboard_roles_to_dashboard() {
    for path in ["/login", "/register", "/verify-email"] {
        for role in [Role::Author, Role::Admin] {
            assert_eq!(
                access::decide(path, &signed_in(), Some(role)),
                Decision::RedirectTo("/dashboard"),
                "{role:?} on {path}"
            );
        }
    }
}

#[test]
fn auth_pages_with_session_route_plain_users_to_profile() {
    for path in ["/login", "/register", "/verify-email"] {
        assert_eq!(
            access::decide(path, &signed_in(), Some(Role::User)),
            Decision::RedirectTo("/profile")
        );
        // Absent role (no profile row, or a failed lookup) gets the
        // lower-privilege page as well.
        assert_eq!(
            access::decide(path, &signed_in(), None),
            Decision::RedirectTo("/profile")
        );
    }
}

// --- Rule 3: the dashboard subtree needs a dashboard-capable role ---

#[test]
fn dashboard_with_plain_user_role_redirects_to_profile() {
    assert_eq!(
        access::decide("/dashboard", &signed_in(), Some(Role::User)),
        Decision::RedirectTo("/profile")
    );
    assert_eq!(
        access::decide("/dashboard", &signed_in(), None),
        Decision::RedirectTo("/profile")
    );
}

#[test]
fn dashboard_with_author_or_admin_is_allowed() {
    assert_eq!(
        access::decide("/dashboard", &signed_in(), Some(Role::Author)),
        Decision::Allow
    );
    assert_eq!(
        access::decide("/dashboard", &signed_in(), Some(Role::Admin)),
        Decision::Allow
    );
}

// --- Rule 4: everything else proceeds ---

#[test]
fn unclassified_paths_are_always_allowed() {
    for path in ["/", "/health", "/api/auth/login", "/api/user/profile", "/swagger-ui"] {
        assert_eq!(access::decide(path, &anonymous(), None), Decision::Allow);
        assert_eq!(
            access::decide(path, &signed_in(), Some(Role::User)),
            Decision::Allow
        );
    }
}

#[test]
fn anonymous_visitors_may_open_auth_pages() {
    for path in ["/login", "/register", "/verify-email"] {
        assert_eq!(access::decide(path, &anonymous(), None), Decision::Allow);
    }
}

#[test]
fn profile_page_with_session_is_allowed_regardless_of_role() {
    assert_eq!(
        access::decide("/profile", &signed_in(), Some(Role::User)),
        Decision::Allow
    );
    assert_eq!(access::decide("/profile", &signed_in(), None), Decision::Allow);
}

// --- Classification ---

#[test]
fn classification_is_prefix_based() {
    assert!(access::is_auth_page("/verify-email/resend"));
    assert!(access::is_protected_page("/dashboard/posts"));
    assert!(access::is_dashboard_page("/dashboard/posts"));
    assert!(!access::is_auth_page("/api/auth/login"));
    assert!(!access::is_protected_page("/"));
}

#[test]
fn auth_and_protected_classes_do_not_overlap() {
    for path in ["/login", "/register", "/verify-email"] {
        assert!(!access::is_protected_page(path));
    }
    for path in ["/profile", "/dashboard"] {
        assert!(!access::is_auth_page(path));
    }
    // The dashboard subtree is the only sanctioned overlap: a subset of the
    // protected pages.
    assert!(access::is_protected_page("/dashboard"));
    assert!(access::is_dashboard_page("/dashboard"));
    assert!(!access::is_dashboard_page("/profile"));
}

// --- Lazy role lookup gate ---

#[test]
fn needs_role_only_where_a_rule_consults_it() {
    // Anonymous requests never need the role.
    assert!(!access::needs_role("/login", &anonymous()));
    assert!(!access::needs_role("/dashboard", &anonymous()));

    // Signed-in requests need it exactly on auth pages and the dashboard.
    assert!(access::needs_role("/login", &signed_in()));
    assert!(access::needs_role("/register", &signed_in()));
    assert!(access::needs_role("/dashboard", &signed_in()));
    assert!(!access::needs_role("/profile", &signed_in()));
    assert!(!access::needs_role("/", &signed_in()));
    assert!(!access::needs_role("/api/user/profile", &signed_in()));
}

// --- Purity ---

#[test]
fn identical_inputs_yield_identical_decisions() {
    let session = signed_in();
    for path in ["/", "/login", "/profile", "/dashboard"] {
        for role in [None, Some(Role::User), Some(Role::Author), Some(Role::Admin)] {
            let first = access::decide(path, &session, role);
            let second = access::decide(path, &session, role);
            assert_eq!(first, second);
        }
    }
}

// --- Shared landing-page computation ---

#[test]
fn landing_page_matches_rule_two_targets() {
    assert_eq!(access::landing_page(Some(Role::Admin)), "/dashboard");
    assert_eq!(access::landing_page(Some(Role::Author)), "/dashboard");
    assert_eq!(access::landing_page(Some(Role::User)), "/profile");
    assert_eq!(access::landing_page(None), "/profile");
}
