//! HTTP surface: shared state, routes and the calendar relay handlers.

mod error;
pub mod handlers;

pub use error::RelayError;

use crate::auth::{handlers as auth_handlers, refresh_session, GoogleOAuth, SessionService};
use crate::config::Config;
use crate::error::AppResult;
use crate::google_calendar::{CalendarApi, GoogleCalendarClient};
use axum::http::{header, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Session token signing and verification
    pub sessions: Arc<SessionService>,
    /// Google sign-in flow
    pub oauth: Arc<GoogleOAuth>,
    /// Remote calendar the relay forwards to
    pub calendar: Arc<dyn CalendarApi>,
}

impl AppState {
    /// Build state around a given calendar backend
    pub fn new(config: Config, calendar: Arc<dyn CalendarApi>) -> AppResult<Self> {
        let http = reqwest::Client::new();
        let oauth = GoogleOAuth::new(http, &config)?;
        let sessions = SessionService::new(&config.session_secret, config.session_ttl_minutes);

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            oauth: Arc::new(oauth),
            calendar,
        })
    }

    /// Build state talking to the Google Calendar API
    pub fn from_config(config: Config) -> AppResult<Self> {
        let calendar = GoogleCalendarClient::new(
            reqwest::Client::new(),
            &config.endpoints.calendar_api_base,
            &config.calendar_id,
        )?;
        Self::new(config, Arc::new(calendar))
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::new();
    };

    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(_) => {
            warn!("Ignoring invalid CORS origin: {}", origin);
            CorsLayer::new()
        }
    }
}

/// Build the complete router
pub fn build_router(state: AppState) -> Router {
    let calendar_routes = Router::new()
        .route("/sync", get(handlers::sync_events))
        .route("/events", post(handlers::create_event))
        .route(
            "/events/{event_id}",
            get(handlers::get_event)
                .patch(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), refresh_session));

    let auth_routes = Router::new()
        .route("/signin", get(auth_handlers::signin_handler))
        .route("/callback/google", get(auth_handlers::callback_handler))
        .route(
            "/signout",
            get(auth_handlers::signout_handler).post(auth_handlers::signout_handler),
        )
        .route("/session", get(auth_handlers::session_handler));

    Router::new()
        .route("/", get(handlers::index_handler))
        .route("/health", get(handlers::health_handler))
        .nest("/api/calendar", calendar_routes)
        .nest("/api/auth", auth_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(state.config.cors_origin.as_deref())),
        )
        .with_state(state)
}
