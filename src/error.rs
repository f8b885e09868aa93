use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(lichhen::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(lichhen::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(lichhen::google_calendar))]
    GoogleCalendar(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(lichhen::auth))]
    Auth(String),

    #[error(transparent)]
    #[diagnostic(code(lichhen::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(lichhen::serialization))]
    Serialization(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}
