#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use http_body_util::BodyExt;
use lichhen::auth::cookies::SESSION_COOKIE_NAME;
use lichhen::auth::SessionUser;
use lichhen::config::Config;
use lichhen::error::{calendar_error, AppResult};
use lichhen::google_calendar::{CalendarApi, RemoteEvent, SyncWindow};
use lichhen::web::AppState;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ACCESS_TOKEN: &str = "ya29.test-access-token";

/// In-memory stand-in for the Google Calendar API
#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<BTreeMap<String, Value>>,
    calls: AtomicUsize,
    next_id: AtomicUsize,
    tokens: Mutex<Vec<String>>,
}

impl InMemoryCalendar {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of remote calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Access tokens the relay presented, in call order
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    fn record(&self, access_token: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(access_token.to_string());
    }
}

fn merge(record: &mut Value, event: &RemoteEvent) {
    let patch = serde_json::to_value(event).unwrap();
    if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl CalendarApi for InMemoryCalendar {
    async fn list_events(&self, access_token: &str, _window: &SyncWindow) -> AppResult<Value> {
        self.record(access_token);
        let items: Vec<Value> = self.events.lock().unwrap().values().cloned().collect();
        Ok(json!({ "kind": "calendar#events", "items": items }))
    }

    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<Value> {
        self.record(access_token);
        self.events
            .lock()
            .unwrap()
            .get(event_id)
            .cloned()
            .ok_or_else(|| calendar_error("Failed to fetch event: HTTP 404 Not Found"))
    }

    async fn insert_event(&self, access_token: &str, event: &RemoteEvent) -> AppResult<Value> {
        self.record(access_token);
        let id = format!("evt{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut record = json!({ "id": id, "kind": "calendar#event", "status": "confirmed" });
        merge(&mut record, event);
        self.events.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &RemoteEvent,
    ) -> AppResult<Value> {
        self.record(access_token);
        let mut events = self.events.lock().unwrap();
        let record = events
            .get_mut(event_id)
            .ok_or_else(|| calendar_error("Failed to patch event: HTTP 404 Not Found"))?;
        merge(record, event);
        Ok(record.clone())
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()> {
        self.record(access_token);
        self.events
            .lock()
            .unwrap()
            .remove(event_id)
            .map(|_| ())
            .ok_or_else(|| calendar_error("Failed to delete event: HTTP 410 Gone"))
    }
}

/// Configuration with test secrets and optional overrides
pub fn test_config(overrides: &[(&'static str, String)]) -> Config {
    let mut vars = HashMap::from([
        ("GOOGLE_CLIENT_ID", "client-id".to_string()),
        ("GOOGLE_CLIENT_SECRET", "client-secret".to_string()),
        ("SESSION_SECRET", "test-session-secret".to_string()),
    ]);
    vars.extend(overrides.iter().cloned());
    Config::from_lookup(|key| vars.get(key).cloned(), None).unwrap()
}

pub fn test_state(calendar: Arc<dyn CalendarApi>) -> AppState {
    AppState::new(test_config(&[]), calendar).unwrap()
}

pub fn test_user() -> SessionUser {
    SessionUser {
        sub: "109876543210".to_string(),
        email: Some("an@example.com".to_string()),
        name: Some("An Nguyen".to_string()),
    }
}

/// `Cookie` header value for a fresh session
pub fn session_cookie(state: &AppState) -> String {
    let token = state.sessions.issue(&test_user(), ACCESS_TOKEN).unwrap();
    format!("{}={}", SESSION_COOKIE_NAME, token)
}

pub fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
