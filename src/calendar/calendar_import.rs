//! ICS import.
//
// Past events are dropped on purpose; malformed components are reported in
// `ParsedCalendar::skipped`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::calendar_validation::{
    component_label, instant_property, text_property, validate_event, Bound, SkippedComponent,
};
use super::Event;
use crate::error::{AgendaError, Result};

/// Events read from an ICS document, plus the components that failed
/// validation.
#[derive(Debug, Default)]
pub struct ParsedCalendar {
    pub events: Vec<Event>,
    pub skipped: Vec<SkippedComponent>,
    /// Components starting before "now".
    pub past: usize,
}

/// Parse an ICS file, dropping events that start before the current instant.
pub fn parse_calendar(path: &Path) -> Result<ParsedCalendar> {
    parse_calendar_at(path, Utc::now())
}

/// Parse an ICS file against an explicit "now".
pub fn parse_calendar_at(path: &Path, now: DateTime<Utc>) -> Result<ParsedCalendar> {
    let file = File::open(path).map_err(|e| AgendaError::io(path, e))?;
    let parsed = parse_reader(BufReader::new(file), now, &path.display().to_string())?;
    info!(
        "Read {} events from {} ({} past, {} skipped)",
        parsed.events.len(),
        path.display(),
        parsed.past,
        parsed.skipped.len()
    );
    Ok(parsed)
}

pub fn parse_calendar_str(text: &str, now: DateTime<Utc>) -> Result<ParsedCalendar> {
    parse_reader(text.as_bytes(), now, "<string>")
}

fn parse_reader<R: BufRead>(reader: R, now: DateTime<Utc>, source: &str) -> Result<ParsedCalendar> {
    let mut parsed = ParsedCalendar::default();

    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|e| AgendaError::MalformedCalendar {
            component: source.to_string(),
            reason: format!("ICS parse error: {e}"),
        })?;

        for (index, component) in calendar.events.iter().enumerate() {
            let uid = text_property(component, "UID");
            let label = component_label(index, uid.as_deref());

            let result = instant_property(component, "DTSTART", Bound::Start, &label).and_then(|start| {
                if start < now {
                    Ok(None)
                } else {
                    validate_event(component, start, &label).map(Some)
                }
            });

            match result {
                Ok(Some(event)) => parsed.events.push(event),
                Ok(None) => {
                    debug!("Skipping past event {}", label);
                    parsed.past += 1;
                }
                Err(error) => {
                    warn!("Skipping {}", error);
                    parsed.skipped.push(SkippedComponent { index, uid, error });
                }
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const ICS: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//test//EN\r\n\
BEGIN:VEVENT\r\n\
UID:future@test\r\n\
SUMMARY:Réunion\\, salle B\r\n\
DTSTART;TZID=Europe/Paris:20300310T100000\r\n\
DTEND;TZID=Europe/Paris:20300310T110000\r\n\
LOCATION:B 104\r\n\
DESCRIPTION:\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:past@test\r\n\
SUMMARY:Old\r\n\
DTSTART:20200101T100000Z\r\n\
DTEND:20200101T110000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:broken@test\r\n\
SUMMARY:No end\r\n\
DTSTART:20300101T100000Z\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Holiday\r\n\
DTSTART;VALUE=DATE:20300401\r\n\
DTEND;VALUE=DATE:20300402\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_filters_and_reports() -> Result<()> {
        let parsed = parse_calendar_str(ICS, now())?;
        let summaries: Vec<_> = parsed.events.iter().map(|e| e.summary()).collect();
        assert_eq!(summaries, vec!["Réunion, salle B", "Holiday"]);
        assert_eq!(parsed.past, 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].uid.as_deref(), Some("broken@test"));
        assert_eq!(parsed.skipped[0].index, 2);

        let meeting = &parsed.events[0];
        assert_eq!(meeting.start().with_timezone(&Utc), Utc.with_ymd_and_hms(2030, 3, 10, 9, 0, 0).unwrap());
        assert_eq!(meeting.location(), Some("B 104"));
        assert_eq!(meeting.description(), None);

        let holiday = &parsed.events[1];
        assert_eq!(holiday.start().to_rfc3339(), "2030-04-01T00:00:00+00:00");
        assert_eq!(holiday.end().format("%Y-%m-%d %H:%M:%S").to_string(), "2030-04-02 23:59:59");
        Ok(())
    }

    #[test]
    fn test_past_event_one_year_back_is_dropped() -> Result<()> {
        let now = Utc::now();
        let start = now - chrono::Duration::days(365);
        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:Last year\r\nDTSTART:{}\r\nDTEND:{}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            start.format("%Y%m%dT%H%M%SZ"),
            (start + chrono::Duration::hours(1)).format("%Y%m%dT%H%M%SZ"),
        );
        let parsed = parse_calendar_str(&ics, now)?;
        assert!(parsed.events.is_empty());
        assert!(parsed.skipped.is_empty());
        assert_eq!(parsed.past, 1);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_calendar(Path::new("/nonexistent/agenda.ics")).unwrap_err();
        assert!(matches!(err, AgendaError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/agenda.ics"));
    }
}
