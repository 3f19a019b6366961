//! ICS export: one VEVENT per event, timestamps in UTC.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::info;
use uuid::Uuid;

use super::calendar_validation::escape_text;
use super::Event;
use crate::error::{AgendaError, Result};

const PRODID: &str = "-//agenda//timetable export//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Write `events` to an ICS file at `path`.
pub fn write_calendar(events: &[Event], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| AgendaError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write_calendar_to(events, &mut writer).map_err(|e| AgendaError::io(path, e))?;
    writer.flush().map_err(|e| AgendaError::io(path, e))?;
    info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}

/// Serialize `events` as an ICS document into any writer.
pub fn write_calendar_to<W: Write>(events: &[Event], mut out: W) -> io::Result<()> {
    let stamp = utc_stamp(&Utc::now().with_timezone(&chrono_tz::UTC));
    write_line(&mut out, "BEGIN:VCALENDAR")?;
    write_line(&mut out, "VERSION:2.0")?;
    write_line(&mut out, &format!("PRODID:{PRODID}"))?;
    write_line(&mut out, "CALSCALE:GREGORIAN")?;
    for event in events {
        write_line(&mut out, "BEGIN:VEVENT")?;
        write_line(&mut out, &format!("UID:{}", event_uid(event)))?;
        write_line(&mut out, &format!("DTSTAMP:{stamp}"))?;
        write_line(&mut out, &format!("SUMMARY:{}", escape_text(event.summary())))?;
        write_line(&mut out, &format!("DTSTART:{}", utc_stamp(event.start())))?;
        write_line(&mut out, &format!("DTEND:{}", utc_stamp(event.end())))?;
        write_line(&mut out, &format!("LOCATION:{}", escape_text(event.location().unwrap_or(""))))?;
        write_line(&mut out, &format!("DESCRIPTION:{}", escape_text(event.description().unwrap_or(""))))?;
        write_line(&mut out, "END:VEVENT")?;
    }
    write_line(&mut out, "END:VCALENDAR")
}

/// Serialize `events` into an in-memory ICS document.
pub fn to_ics_string(events: &[Event]) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_calendar_to(events, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn utc_stamp(instant: &DateTime<Tz>) -> String {
    instant.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}

/// Stable across exports of the same event.
fn event_uid(event: &Event) -> String {
    let key = format!("{}|{}|{}", event.summary(), event.start().to_rfc3339(), event.end().to_rfc3339());
    format!("{}@agenda", Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()))
}

/// Emit one content line, folded at 75 octets without splitting a character.
fn write_line<W: Write>(out: &mut W, line: &str) -> io::Result<()> {
    let mut rest = line;
    // continuation lines spend one octet on the leading fold space
    let mut limit = MAX_LINE_OCTETS;
    while rest.len() > limit {
        let split = fold_point(rest, limit);
        out.write_all(rest[..split].as_bytes())?;
        out.write_all(b"\r\n ")?;
        rest = &rest[split..];
        limit = MAX_LINE_OCTETS - 1;
    }
    out.write_all(rest.as_bytes())?;
    out.write_all(b"\r\n")
}

/// Largest char boundary within `limit` octets that does not leave
/// whitespace at the end of the physical line. Readers strip trailing
/// whitespace from every physical line before unfolding, so a fold right
/// after a space would drop it.
fn fold_point(text: &str, limit: usize) -> usize {
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    let hard = end;
    while let Some(c) = text[..end].chars().next_back() {
        if !c.is_whitespace() {
            return end;
        }
        end -= c.len_utf8();
    }
    // nothing but whitespace to fold on
    hard
}
