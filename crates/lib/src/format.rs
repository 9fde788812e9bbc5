//! Date, time, and text formatting for backend replies and event lists.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

const NO_EVENTS: &str = "No upcoming events";

/// "Today", "Tomorrow", or e.g. "Mon, Jan 15". Compared by calendar date,
/// not time of day.
pub fn format_date(dt: DateTime<Local>) -> String {
    format_date_on(dt.naive_local(), Local::now().date_naive())
}

/// 12-hour clock with zero-padded minutes, e.g. "2:05 PM".
pub fn format_time(dt: DateTime<Local>) -> String {
    format_time_on(dt.naive_local())
}

/// "<date> at <time>", e.g. "Tomorrow at 2:00 PM".
pub fn format_date_time(dt: DateTime<Local>) -> String {
    format_date_time_on(dt.naive_local(), Local::now().date_naive())
}

fn format_date_on(dt: NaiveDateTime, today: NaiveDate) -> String {
    let date = dt.date();
    if date == today {
        return "Today".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Tomorrow".to_string();
    }
    dt.format("%a, %b %-d").to_string()
}

fn format_time_on(dt: NaiveDateTime) -> String {
    dt.format("%-I:%M %p").to_string()
}

fn format_date_time_on(dt: NaiveDateTime, today: NaiveDate) -> String {
    format!("{} at {}", format_date_on(dt, today), format_time_on(dt))
}

/// Calendar event as the backend returns it (Google event shape).
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start: EventStart,
}

/// Event start: timed events carry `dateTime`, all-day events carry `date`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStart {
    pub date_time: Option<DateTime<Local>>,
    pub date: Option<NaiveDate>,
}

/// Numbered "title - when" lines, or the fixed no-events string for an
/// absent or empty sequence. All-day events render at midnight.
pub fn format_events_list(events: Option<&[CalendarEvent]>) -> String {
    let events = match events {
        Some(e) if !e.is_empty() => e,
        _ => return NO_EVENTS.to_string(),
    };
    let today = Local::now().date_naive();
    events
        .iter()
        .enumerate()
        .map(|(idx, event)| {
            format!("{}. {} - {}", idx + 1, event.summary, format_start(&event.start, today))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_start(start: &EventStart, today: NaiveDate) -> String {
    let dt = start
        .date_time
        .map(|d| d.naive_local())
        .or_else(|| start.date.map(|d| d.and_time(NaiveTime::MIN)));
    match dt {
        Some(dt) => format_date_time_on(dt, today),
        None => "(no start time)".to_string(),
    }
}

/// Uppercase the first character, leaving the rest as-is.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut to at most `max_len` characters, appending "..." when shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_len).collect();
    format!("{}...", cut)
}
