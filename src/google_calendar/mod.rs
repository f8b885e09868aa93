//! Google Calendar access on behalf of a signed-in user.
//!
//! The relay never stores events; request and response bodies follow the
//! Calendar v3 JSON schema and are passed through after a minimal shape check.

mod client;
pub mod models;
pub mod time;

pub use client::{CalendarApi, GoogleCalendarClient};
pub use models::{EventInput, RemoteEvent};
pub use time::SyncWindow;
