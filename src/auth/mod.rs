//! Sign-in with Google and the signed session cookie.
//!
//! The session token is a HS256 JWT carrying the user's identity and the
//! calendar-scoped access token. Handlers receive it through the [`Session`]
//! and [`RequireSession`] extractors; nothing about a session is kept server
//! side.

pub mod cookies;
mod extract;
pub mod handlers;
pub mod oauth;
pub mod session;

pub use extract::{
    extract_token, refresh_session, AuthenticatedSession, RequireSession, Session,
};
pub use oauth::GoogleOAuth;
pub use session::{Claims, SessionError, SessionService, SessionUser};
