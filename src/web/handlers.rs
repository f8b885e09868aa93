use super::error::RelayError;
use super::AppState;
use crate::auth::{RequireSession, Session};
use crate::google_calendar::models::event_id;
use crate::error::Error;
use crate::google_calendar::{EventInput, SyncWindow};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

/// Unwrap an event body, reporting a rejected one as a relay failure
fn event_input(
    body: Result<Json<EventInput>, JsonRejection>,
    message: &'static str,
) -> Result<EventInput, RelayError> {
    body.map(|Json(input)| input)
        .map_err(|rejection| RelayError::upstream(message, Error::Serialization(rejection.body_text())))
}

/// List upcoming events in the configured window
pub async fn sync_events(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Json<Value>, RelayError> {
    let window = SyncWindow::upcoming(Utc::now(), state.config.sync_window_days);

    let events = state
        .calendar
        .list_events(session.access_token(), &window)
        .await
        .map_err(|e| RelayError::upstream("Failed to sync calendar", e))?;

    Ok(Json(events))
}

/// Create an event
pub async fn create_event(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    body: Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let body = event_input(body, "Failed to create event")?.into_remote(&state.config.timezone);

    let created = state
        .calendar
        .insert_event(session.access_token(), &body)
        .await
        .map_err(|e| RelayError::upstream("Failed to create event", e))?;

    info!(event_id = ?event_id(&created), user = %session.claims.sub, "Created event");
    Ok(Json(created))
}

/// Fetch one event
pub async fn get_event(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
) -> Result<Json<Value>, RelayError> {
    let event = state
        .calendar
        .get_event(session.access_token(), &id)
        .await
        .map_err(|e| RelayError::upstream("Failed to load event", e))?;

    Ok(Json(event))
}

/// Patch an event
pub async fn update_event(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
    body: Result<Json<EventInput>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let body = event_input(body, "Failed to update event")?.into_remote(&state.config.timezone);

    let updated = state
        .calendar
        .patch_event(session.access_token(), &id, &body)
        .await
        .map_err(|e| RelayError::upstream("Failed to update event", e))?;

    info!(event_id = %id, user = %session.claims.sub, "Updated event");
    Ok(Json(updated))
}

/// Delete an event
pub async fn delete_event(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Path(id): Path<String>,
) -> Result<StatusCode, RelayError> {
    state
        .calendar
        .delete_event(session.access_token(), &id)
        .await
        .map_err(|e| RelayError::upstream("Failed to delete event", e))?;

    info!(event_id = %id, user = %session.claims.sub, "Deleted event");
    Ok(StatusCode::NO_CONTENT)
}

/// Landing route: signed-in visitors go to the dashboard
pub async fn index_handler(State(state): State<AppState>, session: Session) -> Response {
    if session.is_authenticated() {
        return Redirect::to(&state.config.dashboard_path).into_response();
    }

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "signin": "/api/auth/signin",
    }))
    .into_response()
}

/// Health check
pub async fn health_handler() -> &'static str {
    "ok"
}
