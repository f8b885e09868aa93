use super::cookies::{
    clear_session_cookie, clear_state_cookie, session_cookie, state_cookie, STATE_COOKIE_NAME,
};
use super::extract::Session;
use crate::error::Error;
use crate::web::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Sign-in flow failures
#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    /// The provider reported an error, typically a denied consent
    #[error("Sign-in was cancelled: {0}")]
    Denied(String),

    /// Callback arrived without the expected `code`/`state`
    #[error("Missing authorization code")]
    MissingCode,

    /// `state` did not match the cookie set at sign-in
    #[error("Invalid sign-in state")]
    StateMismatch,

    /// Code exchange or profile lookup failed
    #[error("Sign-in failed")]
    Provider(#[source] Error),
}

impl IntoResponse for SignInError {
    fn into_response(self) -> Response {
        let status = match &self {
            SignInError::Denied(_) | SignInError::MissingCode | SignInError::StateMismatch => {
                StatusCode::BAD_REQUEST
            }
            SignInError::Provider(e) => {
                error!("Sign-in provider error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Query parameters Google appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Start the sign-in flow
pub async fn signin_handler(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let oauth_state = uuid::Uuid::new_v4().to_string();
    let url = state.oauth.authorize_url(&oauth_state);

    let jar = jar.add(state_cookie(&oauth_state, state.config.cookie_secure));
    (jar, Redirect::to(url.as_str()))
}

/// Finish the sign-in flow and mint the session cookie
pub async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect), SignInError> {
    if let Some(reason) = params.error {
        warn!("Provider returned sign-in error: {}", reason);
        return Err(SignInError::Denied(reason));
    }

    let code = params.code.ok_or(SignInError::MissingCode)?;
    let expected = jar
        .get(STATE_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .ok_or(SignInError::StateMismatch)?;
    if params.state.as_deref() != Some(expected.as_str()) {
        return Err(SignInError::StateMismatch);
    }

    let token = state
        .oauth
        .exchange_code(&code)
        .await
        .map_err(SignInError::Provider)?;
    let user = state
        .oauth
        .fetch_user(&token.access_token)
        .await
        .map_err(SignInError::Provider)?;
    let session_token = state
        .sessions
        .issue(&user, &token.access_token)
        .map_err(SignInError::Provider)?;

    info!("User {} signed in", user.sub);

    let jar = jar.add(clear_state_cookie()).add(session_cookie(
        &session_token,
        state.config.session_ttl_minutes,
        state.config.cookie_secure,
    ));
    Ok((jar, Redirect::to(&state.config.dashboard_path)))
}

/// Drop the session cookie and return to the landing page
pub async fn signout_handler(jar: CookieJar) -> impl IntoResponse {
    (jar.add(clear_session_cookie()), Redirect::to("/"))
}

/// Public view of the current session; never exposes the access token
pub async fn session_handler(session: Session) -> Json<Value> {
    match session {
        Session::Authenticated(auth) => {
            let claims = &auth.claims;
            Json(json!({
                "user": {
                    "id": claims.sub,
                    "name": claims.name,
                    "email": claims.email,
                },
                "expires": claims.expires_at().map(|t| t.to_rfc3339()),
            }))
        }
        Session::Anonymous => Json(json!({})),
    }
}
