use super::cookies::{session_cookie, SESSION_COOKIE_NAME};
use super::session::{Claims, SessionError};
use crate::web::{AppState, RelayError};
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::convert::Infallible;
use tracing::{debug, error};

/// A signed-in caller and the credential the relay forwards for them
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub claims: Claims,
}

impl AuthenticatedSession {
    /// Bearer token for the remote calendar
    pub fn access_token(&self) -> &str {
        &self.claims.access_token
    }
}

/// Session state of an inbound request
#[derive(Debug, Clone)]
pub enum Session {
    Authenticated(AuthenticatedSession),
    Anonymous,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}

/// Raw session token from the cookie, falling back to an `Authorization: Bearer` header
pub fn extract_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return Some(cookie.value().to_string());
    }

    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn resolve_session(parts: &Parts, state: &AppState) -> Session {
    let Some(token) = extract_token(parts) else {
        return Session::Anonymous;
    };

    match state.sessions.verify(&token) {
        Ok(claims) => Session::Authenticated(AuthenticatedSession { claims }),
        Err(SessionError::Expired) => {
            debug!("Session expired, treating request as anonymous");
            Session::Anonymous
        }
        Err(SessionError::Invalid) => {
            debug!("Session token rejected");
            Session::Anonymous
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(resolve_session(parts, state))
    }
}

/// Extractor that admits only authenticated callers.
///
/// Rejects with [`RelayError::Unauthorized`] before the handler body, and so
/// before any remote call, when the session is anonymous.
#[derive(Debug, Clone)]
pub struct RequireSession(pub AuthenticatedSession);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = RelayError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state) {
            Session::Authenticated(session) => Ok(RequireSession(session)),
            Session::Anonymous => Err(RelayError::Unauthorized),
        }
    }
}

/// Re-issue the session cookie once half its lifetime has passed
pub async fn refresh_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let refreshed = jar
        .get(SESSION_COOKIE_NAME)
        .and_then(|cookie| state.sessions.verify(cookie.value()).ok())
        .filter(|claims| state.sessions.needs_refresh(claims, Utc::now()))
        .and_then(|claims| match state.sessions.refresh(&claims) {
            Ok(token) => Some(token),
            Err(e) => {
                error!("Failed to refresh session: {}", e);
                None
            }
        });

    let response = next.run(request).await;

    match refreshed {
        Some(token) => {
            let cookie = session_cookie(
                &token,
                state.config.session_ttl_minutes,
                state.config.cookie_secure,
            );
            (jar.add(cookie), response).into_response()
        }
        None => response,
    }
}
