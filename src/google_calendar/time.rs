use crate::error::{config_error, AppResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use chrono_tz::Tz;

/// Time range used when listing upcoming events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

impl SyncWindow {
    /// Window starting at `now` and ending `days` days later, clamped to the latest representable time
    pub fn upcoming(now: DateTime<Utc>, days: i64) -> Self {
        let time_max = Duration::try_days(days)
            .and_then(|span| now.checked_add_signed(span))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            time_min: now,
            time_max,
        }
    }

    /// Lower bound formatted for the `timeMin` query parameter
    pub fn time_min_param(&self) -> String {
        format_timestamp(&self.time_min)
    }

    /// Upper bound formatted for the `timeMax` query parameter
    pub fn time_max_param(&self) -> String {
        format_timestamp(&self.time_max)
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| config_error(&format!("Unknown timezone: {}", name)))
}
