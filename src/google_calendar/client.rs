use super::models::{expect_event, expect_event_list, RemoteEvent};
use super::time::SyncWindow;
use crate::error::{calendar_error, AppResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

/// Operations the relay performs against the remote calendar.
///
/// Every call carries the caller's bearer access token; implementations keep
/// no per-user state.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List events inside the window, expanded and ordered by start time
    async fn list_events(&self, access_token: &str, window: &SyncWindow) -> AppResult<Value>;

    /// Fetch a single event
    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<Value>;

    /// Insert a new event and return the created record
    async fn insert_event(&self, access_token: &str, event: &RemoteEvent) -> AppResult<Value>;

    /// Patch an existing event and return the updated record
    async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &RemoteEvent,
    ) -> AppResult<Value>;

    /// Delete an event
    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()>;
}

/// Google Calendar v3 REST client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    api_base: Url,
    calendar_id: String,
}

impl GoogleCalendarClient {
    /// Create a client for one calendar under the given API base URL
    pub fn new(client: Client, api_base: &str, calendar_id: &str) -> AppResult<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| calendar_error(&format!("Failed to parse URL: {}", e)))?;

        Ok(Self {
            client,
            api_base,
            calendar_id: calendar_id.to_string(),
        })
    }

    /// `.../calendars/{calendarId}/events[/{eventId}]`
    fn events_url(&self, event_id: Option<&str>) -> AppResult<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| calendar_error("Calendar API base URL cannot carry a path"))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, access_token: &str, action: &str) -> AppResult<Response> {
        let response = request
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| calendar_error(&format!("Failed to {}: {}", action, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(calendar_error(&format!(
                "Failed to {}: HTTP {} - {}",
                action, status, error_body
            )));
        }

        Ok(response)
    }

    async fn read_json(response: Response, action: &str) -> AppResult<Value> {
        response
            .json::<Value>()
            .await
            .map_err(|e| calendar_error(&format!("Failed to parse {} response: {}", action, e)))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(&self, access_token: &str, window: &SyncWindow) -> AppResult<Value> {
        let mut url = self.events_url(None)?;
        url.query_pairs_mut()
            .append_pair("timeMin", &window.time_min_param())
            .append_pair("timeMax", &window.time_max_param())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        debug!(calendar_id = %self.calendar_id, "listing upcoming events");
        let response = self
            .send(self.client.get(url), access_token, "fetch events")
            .await?;
        expect_event_list(Self::read_json(response, "events").await?)
    }

    async fn get_event(&self, access_token: &str, event_id: &str) -> AppResult<Value> {
        let url = self.events_url(Some(event_id))?;

        debug!(calendar_id = %self.calendar_id, event_id, "fetching event");
        let response = self
            .send(self.client.get(url), access_token, "fetch event")
            .await?;
        expect_event(Self::read_json(response, "event").await?)
    }

    async fn insert_event(&self, access_token: &str, event: &RemoteEvent) -> AppResult<Value> {
        let url = self.events_url(None)?;

        debug!(calendar_id = %self.calendar_id, "inserting event");
        let response = self
            .send(self.client.post(url).json(event), access_token, "insert event")
            .await?;
        expect_event(Self::read_json(response, "insert").await?)
    }

    async fn patch_event(
        &self,
        access_token: &str,
        event_id: &str,
        event: &RemoteEvent,
    ) -> AppResult<Value> {
        let url = self.events_url(Some(event_id))?;

        debug!(calendar_id = %self.calendar_id, event_id, "patching event");
        let response = self
            .send(self.client.patch(url).json(event), access_token, "patch event")
            .await?;
        expect_event(Self::read_json(response, "patch").await?)
    }

    async fn delete_event(&self, access_token: &str, event_id: &str) -> AppResult<()> {
        let url = self.events_url(Some(event_id))?;

        debug!(calendar_id = %self.calendar_id, event_id, "deleting event");
        self.send(self.client.delete(url), access_token, "delete event")
            .await?;
        Ok(())
    }
}
