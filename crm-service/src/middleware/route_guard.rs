//! Route guarding for the page-level HTTP surface.
//!
//! Unauthenticated requests on protected path prefixes are redirected to
//! the login path with the original path preserved in `redirectTo`;
//! authenticated users landing on auth-flow paths are sent back to `/`.
//! Data endpoints are not listed here - they answer 401 through the access
//! guard instead of redirecting.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::SessionContext;

pub const LOGIN_PATH: &str = "/authentication/login";

const AUTH_FLOW_PREFIX: &str = "/authentication";
const PROTECTED_PREFIXES: &[&str] = &["/clients", "/offers", "/templates", "/settings"];

/// True for the root page and every protected prefix (exact or nested).
pub fn is_protected_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
}

/// True for the login/signup flow pages.
pub fn is_auth_flow_path(path: &str) -> bool {
    path == AUTH_FLOW_PREFIX || path.starts_with(&format!("{}/", AUTH_FLOW_PREFIX))
}

/// The login redirect target, preserving the original path.
pub fn login_redirect(path: &str) -> String {
    format!("{}?redirectTo={}", LOGIN_PATH, path)
}

pub async fn route_guard_middleware(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let authenticated = req
        .extensions()
        .get::<SessionContext>()
        .map(|ctx| ctx.session.is_some())
        .unwrap_or(false);

    if !authenticated && is_protected_path(&path) {
        return Redirect::temporary(&login_redirect(&path)).into_response();
    }

    if authenticated && is_auth_flow_path(&path) {
        return Redirect::temporary("/").into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_prefixes_cover_nested_paths() {
        assert!(is_protected_path("/"));
        assert!(is_protected_path("/clients"));
        assert!(is_protected_path("/clients/42"));
        assert!(is_protected_path("/offers"));
        assert!(is_protected_path("/templates/abc/edit"));
        assert!(is_protected_path("/settings"));
    }

    #[test]
    fn auth_flow_and_health_are_not_protected() {
        assert!(!is_protected_path("/authentication/login"));
        assert!(!is_protected_path("/health"));
        assert!(!is_protected_path("/clientsearch"));
    }

    #[test]
    fn login_redirect_preserves_the_original_path() {
        assert_eq!(
            login_redirect("/clients"),
            "/authentication/login?redirectTo=/clients"
        );
        assert_eq!(
            login_redirect("/offers/7"),
            "/authentication/login?redirectTo=/offers/7"
        );
    }

    #[test]
    fn auth_flow_paths_match_exact_and_nested() {
        assert!(is_auth_flow_path("/authentication"));
        assert!(is_auth_flow_path("/authentication/login"));
        assert!(!is_auth_flow_path("/authenticate"));
    }
}
