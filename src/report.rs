//! Tabular reports of events and conflicts, as CSV or JSON.

use std::io::Write;

use serde::Serialize;

use crate::calendar::Event;
use crate::conflicts::Conflict;

#[derive(Debug, Serialize)]
struct EventRow<'a> {
    summary: &'a str,
    dtstart: String,
    dtend: String,
    location: &'a str,
    description: &'a str,
}

impl<'a> From<&'a Event> for EventRow<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            summary: event.summary(),
            dtstart: event.start().to_rfc3339(),
            dtend: event.end().to_rfc3339(),
            location: event.location().unwrap_or(""),
            description: event.description().unwrap_or(""),
        }
    }
}

#[derive(Debug, Serialize)]
struct ConflictRow<'a> {
    event1_summary: &'a str,
    event1_dtstart: String,
    event1_dtend: String,
    event2_summary: &'a str,
    event2_dtstart: String,
    event2_dtend: String,
}

impl<'a> From<&'a Conflict> for ConflictRow<'a> {
    fn from(conflict: &'a Conflict) -> Self {
        Self {
            event1_summary: conflict.first.summary(),
            event1_dtstart: conflict.first.start().to_rfc3339(),
            event1_dtend: conflict.first.end().to_rfc3339(),
            event2_summary: conflict.second.summary(),
            event2_dtstart: conflict.second.start().to_rfc3339(),
            event2_dtend: conflict.second.end().to_rfc3339(),
        }
    }
}

pub const EVENT_COLUMNS: [&str; 5] = ["summary", "dtstart", "dtend", "location", "description"];

pub const CONFLICT_COLUMNS: [&str; 6] = [
    "event1_summary",
    "event1_dtstart",
    "event1_dtend",
    "event2_summary",
    "event2_dtstart",
    "event2_dtend",
];

/// The header row is written up front so that an empty report still names
/// its columns.
fn csv_writer<W: Write>(out: W, columns: &[&str]) -> csv::Result<csv::Writer<W>> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(columns)?;
    Ok(writer)
}

/// Columns: [`EVENT_COLUMNS`].
pub fn write_events_csv<W: Write>(events: &[Event], out: W) -> csv::Result<()> {
    let mut writer = csv_writer(out, &EVENT_COLUMNS)?;
    for event in events {
        writer.serialize(EventRow::from(event))?;
    }
    writer.flush()?;
    Ok(())
}

/// Columns: [`CONFLICT_COLUMNS`].
pub fn write_conflicts_csv<W: Write>(conflicts: &[Conflict], out: W) -> csv::Result<()> {
    let mut writer = csv_writer(out, &CONFLICT_COLUMNS)?;
    for conflict in conflicts {
        writer.serialize(ConflictRow::from(conflict))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn events_json(events: &[Event]) -> serde_json::Result<String> {
    let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
    serde_json::to_string_pretty(&rows)
}

pub fn conflicts_json(conflicts: &[Conflict]) -> serde_json::Result<String> {
    let rows: Vec<ConflictRow> = conflicts.iter().map(ConflictRow::from).collect();
    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflicts::find_conflicts;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;
    use pretty_assertions::assert_eq;

    fn events() -> Vec<Event> {
        vec![
            Event::new(
                "FLUID TP Grp G1",
                Paris.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(),
                Paris.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
            )
            .unwrap()
            .with_location(Some("B, 104".to_string())),
            Event::new(
                "Meeting",
                Paris.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
                Paris.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_events_csv_columns() {
        let mut buf = Vec::new();
        write_events_csv(&events(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "summary,dtstart,dtend,location,description");
        assert_eq!(
            lines[1],
            "FLUID TP Grp G1,2025-03-10T08:00:00+01:00,2025-03-10T10:00:00+01:00,\"B, 104\","
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_conflicts_csv_and_json() {
        let conflicts = find_conflicts(&events());
        let mut buf = Vec::new();
        write_conflicts_csv(&conflicts, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "event1_summary,event1_dtstart,event1_dtend,event2_summary,event2_dtstart,event2_dtend\n"
        ));
        assert!(text.contains("FLUID TP Grp G1,"));

        let json: serde_json::Value = serde_json::from_str(&conflicts_json(&conflicts).unwrap()).unwrap();
        assert_eq!(json[0]["event2_summary"], "Meeting");
    }

    #[test]
    fn test_empty_reports_keep_header_row() {
        let mut buf = Vec::new();
        write_events_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "summary,dtstart,dtend,location,description\n");

        let mut buf = Vec::new();
        write_conflicts_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "event1_summary,event1_dtstart,event1_dtend,event2_summary,event2_dtstart,event2_dtend\n"
        );
    }
}
