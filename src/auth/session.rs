use crate::error::{auth_error, AppResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity returned by the provider at sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Provider subject identifier
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// JWT claims carried in the session cookie
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (provider user ID)
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Calendar-scoped bearer token issued by the provider
    pub access_token: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            sub: self.sub.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    /// Expiry as a UTC timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp as i64, 0)
    }
}

/// Why a presented session token was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session token is invalid")]
    Invalid,
    #[error("session token has expired")]
    Expired,
}

/// Mints and verifies session tokens
pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionService {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_minutes(ttl_minutes).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a session token valid from now
    pub fn issue(&self, user: &SessionUser, access_token: &str) -> AppResult<String> {
        self.issue_at(user, access_token, Utc::now())
    }

    /// Issue a session token as if minted at `now`
    pub fn issue_at(
        &self,
        user: &SessionUser,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| auth_error("Session lifetime is out of range"))?;

        let claims = Claims {
            sub: user.sub.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            access_token: access_token.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| auth_error(&format!("Failed to generate session token: {}", e)))
    }

    /// Validate a session token
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            })
    }

    /// Whether more than half of the session lifetime has elapsed
    pub fn needs_refresh(&self, claims: &Claims, now: DateTime<Utc>) -> bool {
        let issued = claims.iat as i64;
        let half_life = self.ttl.num_seconds() / 2;
        now.timestamp() - issued >= half_life
    }

    /// Re-issue a session with the same identity and access token
    pub fn refresh(&self, claims: &Claims) -> AppResult<String> {
        self.issue(&claims.user(), &claims.access_token)
    }
}
