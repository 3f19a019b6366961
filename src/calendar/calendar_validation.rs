//! Per-component validation of VEVENTs.
//
// Each component either becomes an `Event` or an error naming the component
// and the failing property; nothing is dropped silently.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;

use super::Event;
use crate::error::AgendaError;

/// A VEVENT rejected during parsing.
#[derive(Debug)]
pub struct SkippedComponent {
    /// Position of the VEVENT within its calendar.
    pub index: usize,
    pub uid: Option<String>,
    pub error: AgendaError,
}

impl fmt::Display for SkippedComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// Which end of the interval a date-only value anchors to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Start,
    End,
}

pub(crate) fn component_label(index: usize, uid: Option<&str>) -> String {
    match uid {
        Some(uid) => format!("VEVENT #{index} (UID {uid})"),
        None => format!("VEVENT #{index}"),
    }
}

pub(crate) fn find_property<'a>(event: &'a IcalEvent, name: &str) -> Option<&'a Property> {
    event.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub(crate) fn text_property(event: &IcalEvent, name: &str) -> Option<String> {
    find_property(event, name)
        .and_then(|p| p.value.as_deref())
        .map(unescape_text)
        .filter(|s| !s.is_empty())
}

fn param<'a>(property: &'a Property, name: &str) -> Option<&'a str> {
    property
        .params
        .as_ref()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .and_then(|(_, values)| values.first())
        .map(String::as_str)
}

/// Read DTSTART or DTEND into a zone-aware instant.
pub(crate) fn instant_property(
    event: &IcalEvent,
    name: &str,
    bound: Bound,
    component: &str,
) -> Result<DateTime<Tz>, AgendaError> {
    let malformed = |reason: String| AgendaError::MalformedCalendar {
        component: component.to_string(),
        reason,
    };
    let property = find_property(event, name).ok_or_else(|| malformed(format!("missing {name}")))?;
    let value = property
        .value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| malformed(format!("{name} has no value")))?;

    let is_date = param(property, "VALUE").is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()));
    if is_date {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d")
            .map_err(|e| malformed(format!("{name} '{value}' is not a date: {e}")))?;
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN),
        };
        return Ok(Utc.from_utc_datetime(&date.and_time(time)).with_timezone(&chrono_tz::UTC));
    }

    let (local, utc) = match value.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (value, false),
    };
    let naive = NaiveDateTime::parse_from_str(local, "%Y%m%dT%H%M%S")
        .map_err(|e| malformed(format!("{name} '{value}' is not a date-time: {e}")))?;

    if utc {
        return Ok(Utc.from_utc_datetime(&naive).with_timezone(&chrono_tz::UTC));
    }
    match param(property, "TZID") {
        Some(tzid) => {
            let tz: Tz = tzid
                .trim_matches('"')
                .trim_start_matches('/')
                .parse()
                .map_err(|_| malformed(format!("{name} has unknown TZID '{tzid}'")))?;
            tz.from_local_datetime(&naive)
                .earliest()
                .ok_or_else(|| malformed(format!("{name} '{value}' does not exist in {tz}")))
        }
        // floating times are read as UTC
        None => Ok(Utc.from_utc_datetime(&naive).with_timezone(&chrono_tz::UTC)),
    }
}

/// Build an event from a component whose start is already known.
pub(crate) fn validate_event(
    event: &IcalEvent,
    start: DateTime<Tz>,
    component: &str,
) -> Result<Event, AgendaError> {
    let end = instant_property(event, "DTEND", Bound::End, component)?;
    let summary = text_property(event, "SUMMARY").unwrap_or_default();
    Event::new(summary, start, end)
        .map_err(|e| AgendaError::MalformedCalendar {
            component: component.to_string(),
            reason: e.to_string(),
        })
        .map(|event_record| {
            event_record
                .with_location(text_property(event, "LOCATION"))
                .with_description(text_property(event, "DESCRIPTION"))
        })
}

/// Decode RFC 5545 TEXT escapes.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Encode RFC 5545 TEXT escapes.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
