/// Router Module Index
///
/// Organizes the application's routing into access-segregated modules. The
/// request guard layered in `create_router` evaluates every inbound path;
/// the split below documents which routes additionally rely on a session.
///
/// Routes accessible to any client: the landing and auth pages, the three
/// auth API endpoints, and the health probe.
pub mod public;

/// Routes that require a live session: the profile and dashboard pages
/// (guard-redirected when anonymous) and the profile API (401 via the
/// `CurrentUser` extractor).
pub mod protected;
