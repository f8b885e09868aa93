use crate::error::{config_error, env_error, AppResult};
use crate::google_calendar::time::parse_timezone;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;

/// Default timezone attached to outbound event times
pub const DEFAULT_TIMEZONE: &str = "Asia/Ho_Chi_Minh";

/// Longest accepted upcoming-events window
pub const MAX_SYNC_WINDOW_DAYS: i64 = 3650;

/// Longest accepted session lifetime (one year)
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Optional settings file, read after the environment defaults
pub const CONFIG_FILE: &str = "config/lichhen.toml";

/// Google endpoints used for sign-in and calendar access
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleEndpoints {
    /// Base URL of the Calendar v3 API
    pub calendar_api_base: String,
    /// OAuth authorization endpoint
    pub auth_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// OpenID userinfo endpoint
    pub userinfo_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            calendar_api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
        }
    }
}

/// Main configuration structure for the service
#[derive(Clone)]
pub struct Config {
    /// Google OAuth client ID
    pub google_client_id: String,
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// Secret used to sign session tokens
    pub session_secret: String,
    /// Externally visible base URL, used to build the OAuth redirect URI
    pub public_url: String,
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Calendar the relay operates on
    pub calendar_id: String,
    /// Default timezone for event start/end times
    pub timezone: String,
    /// Size of the upcoming-events window in days
    pub sync_window_days: i64,
    /// Session lifetime in minutes
    pub session_ttl_minutes: i64,
    /// Whether cookies carry the Secure attribute
    pub cookie_secure: bool,
    /// Allowed browser origin for cross-origin calls
    pub cors_origin: Option<String>,
    /// Where signed-in visitors of `/` are sent
    pub dashboard_path: String,
    /// Google endpoints
    pub endpoints: GoogleEndpoints,
}

/// Non-secret settings that may be overridden from [`CONFIG_FILE`]
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub public_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub calendar_id: Option<String>,
    pub timezone: Option<String>,
    pub sync_window_days: Option<i64>,
    pub session_ttl_minutes: Option<i64>,
    pub cookie_secure: Option<bool>,
    pub cors_origin: Option<String>,
    pub dashboard_path: Option<String>,
    pub endpoints: Option<GoogleEndpoints>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let file = match fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Some(toml::from_str::<ConfigFile>(&content)?),
            Err(_) => None,
        };

        Self::from_lookup(|key| env::var(key).ok(), file)
    }

    /// Build the configuration from a variable lookup and optional file settings.
    ///
    /// Precedence is environment, then file, then built-in defaults.
    pub fn from_lookup<F>(lookup: F, file: Option<ConfigFile>) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();

        let required = |key: &str| lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| env_error(key));

        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let google_client_secret = required("GOOGLE_CLIENT_SECRET")?;
        let session_secret = required("SESSION_SECRET")?;

        let port = match lookup("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid PORT value: {}", p)))?,
            None => file.port.unwrap_or(3000),
        };

        let sync_window_days = match lookup("SYNC_WINDOW_DAYS") {
            Some(d) => d
                .parse::<i64>()
                .map_err(|_| config_error(&format!("Invalid SYNC_WINDOW_DAYS value: {}", d)))?,
            None => file.sync_window_days.unwrap_or(30),
        };
        if !(1..=MAX_SYNC_WINDOW_DAYS).contains(&sync_window_days) {
            return Err(config_error(&format!(
                "SYNC_WINDOW_DAYS must be between 1 and {}",
                MAX_SYNC_WINDOW_DAYS
            )));
        }

        let session_ttl_minutes = match lookup("SESSION_TTL_MINUTES") {
            Some(m) => m
                .parse::<i64>()
                .map_err(|_| config_error(&format!("Invalid SESSION_TTL_MINUTES value: {}", m)))?,
            None => file.session_ttl_minutes.unwrap_or(60 * 24 * 30),
        };
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&session_ttl_minutes) {
            return Err(config_error(&format!(
                "SESSION_TTL_MINUTES must be between 1 and {}",
                MAX_SESSION_TTL_MINUTES
            )));
        }

        let cookie_secure = match lookup("COOKIE_SECURE") {
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            None => file.cookie_secure.unwrap_or(false),
        };

        let timezone = lookup("TIMEZONE")
            .or(file.timezone)
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        parse_timezone(&timezone)?;

        let public_url = lookup("PUBLIC_URL")
            .or(file.public_url)
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let mut endpoints = file.endpoints.unwrap_or_default();
        if let Some(base) = lookup("GOOGLE_CALENDAR_API_BASE") {
            endpoints.calendar_api_base = base;
        }
        if let Some(url) = lookup("GOOGLE_AUTH_URL") {
            endpoints.auth_url = url;
        }
        if let Some(url) = lookup("GOOGLE_TOKEN_URL") {
            endpoints.token_url = url;
        }
        if let Some(url) = lookup("GOOGLE_USERINFO_URL") {
            endpoints.userinfo_url = url;
        }

        Ok(Config {
            google_client_id,
            google_client_secret,
            session_secret,
            public_url,
            host: lookup("HOST").or(file.host).unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            calendar_id: lookup("CALENDAR_ID")
                .or(file.calendar_id)
                .unwrap_or_else(|| "primary".to_string()),
            timezone,
            sync_window_days,
            session_ttl_minutes,
            cookie_secure,
            cors_origin: lookup("CORS_ORIGIN").or(file.cors_origin),
            dashboard_path: lookup("DASHBOARD_PATH")
                .or(file.dashboard_path)
                .unwrap_or_else(|| "/dashboard".to_string()),
            endpoints,
        })
    }

    /// Redirect URI registered with Google for the OAuth callback
    pub fn redirect_uri(&self) -> String {
        format!("{}/api/auth/callback/google", self.public_url)
    }
}
