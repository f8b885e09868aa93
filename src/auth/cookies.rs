use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Cookie holding the signed session token
pub const SESSION_COOKIE_NAME: &str = "lichhen.session-token";

/// Cookie holding the OAuth `state` between sign-in redirect and callback
pub const STATE_COOKIE_NAME: &str = "lichhen.oauth-state";

const AUTH_PATH: &str = "/api/auth";

/// Create the session cookie
pub fn session_cookie(token: &str, ttl_minutes: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::minutes(ttl_minutes))
        .build()
}

/// Create the removal cookie for the session
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Create the OAuth state cookie for the authorization request
pub fn state_cookie(state: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(AUTH_PATH)
        .max_age(Duration::minutes(10))
        .build()
}

/// Create the removal cookie for the OAuth state
pub fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, ""))
        .path(AUTH_PATH)
        .max_age(Duration::ZERO)
        .build()
}
