//! Session middleware - resolves the inbound session against the identity
//! provider and stores the result in request extensions.
//!
//! Resolution never fails the request here: an absent or invalid token
//! simply yields an unauthenticated context, and each protected operation
//! decides what that means (the route guard redirects pages, the access
//! guard fails data operations with Unauthenticated).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use crm_core::error::AppError;
use uuid::Uuid;

use crate::AppState;

/// Session cookie set by the login flow (owned by the external UI layer).
pub const SESSION_COOKIE: &str = "session_token";

/// Cookie persisting the explicit active-organization selection.
pub const ACTIVE_ORG_COOKIE: &str = "active_org";

/// The principal for the current request, as confirmed by the identity
/// provider.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub external_id: String,
    pub email: String,
    pub full_name: Option<String>,
}

/// Request-scoped session state. Always present in extensions once the
/// session middleware has run, authenticated or not.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session: Option<AuthenticatedSession>,
    pub selected_org: Option<Uuid>,
}

fn bearer_token(parts_headers: &axum::http::HeaderMap) -> Option<String> {
    parts_headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Resolve the session token (cookie first, Bearer header as fallback)
/// against the identity provider and stash a SessionContext for downstream
/// middleware and handlers.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());

    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| bearer_token(req.headers()));

    let session = match token {
        Some(token) => match state.identity.get_user(&token).await {
            Ok(user) => user.map(|u| AuthenticatedSession {
                external_id: u.id,
                email: u.email,
                full_name: u.full_name,
            }),
            // Provider outages resolve to "no session" rather than failing
            // the request; the session contract is null-not-throw.
            Err(e) => {
                tracing::error!(error = %e, "Identity provider lookup failed");
                None
            }
        },
        None => None,
    };

    let selected_org = jar
        .get(ACTIVE_ORG_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok());

    req.extensions_mut().insert(SessionContext {
        session,
        selected_org,
    });

    next.run(req).await
}

/// Extractor handing handlers the request's SessionContext. Rejects with
/// ContextMissing when the session middleware is not installed, so the
/// dependency is enforced by the type system rather than a panic.
pub struct CurrentSession(pub SessionContext);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .map(CurrentSession)
            .ok_or(AppError::ContextMissing("session middleware not installed"))
    }
}
