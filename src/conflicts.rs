//! Conflict detection over a mixed set of events.
//
// This is a chain scan: events are sorted by start and only neighbours are
// compared. An event overlapping a later, non-adjacent one is missed when
// the event between them overlaps neither.

use log::info;
use serde::Serialize;

use crate::calendar::Event;

/// Two adjacent (after sorting by start) events whose intervals overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub first: Event,
    pub second: Event,
}

/// Sort `events` by start and report each adjacent pair where the later
/// event starts strictly before the earlier one ends.
pub fn find_conflicts(events: &[Event]) -> Vec<Conflict> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by(|a, b| a.start().cmp(b.start()));

    let conflicts: Vec<Conflict> = sorted
        .windows(2)
        .filter(|pair| pair[1].start() < pair[0].end())
        .map(|pair| Conflict { first: pair[0].clone(), second: pair[1].clone() })
        .collect();

    info!("Found {} conflicts among {} events", conflicts.len(), events.len());
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;
    use pretty_assertions::assert_eq;

    fn event(summary: &str, (h1, m1): (u32, u32), (h2, m2): (u32, u32)) -> Event {
        Event::new(
            summary,
            Paris.with_ymd_and_hms(2025, 3, 10, h1, m1, 0).unwrap(),
            Paris.with_ymd_and_hms(2025, 3, 10, h2, m2, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_overlapping_pair() {
        let a = event("A", (10, 0), (11, 0));
        let b = event("B", (10, 30), (11, 30));
        let conflicts = find_conflicts(&[b.clone(), a.clone()]);
        assert_eq!(conflicts, vec![Conflict { first: a, second: b }]);
    }

    #[test]
    fn test_touching_events_do_not_conflict() {
        let a = event("A", (10, 0), (11, 0));
        let b = event("B", (11, 0), (12, 0));
        assert!(find_conflicts(&[a, b]).is_empty());
    }

    #[test]
    fn test_three_overlapping_events_give_two_adjacent_conflicts() {
        let events = [
            event("A", (10, 0), (12, 0)),
            event("B", (10, 30), (12, 0)),
            event("C", (11, 0), (12, 0)),
        ];
        let conflicts = find_conflicts(&events);
        let pairs: Vec<_> = conflicts.iter().map(|c| (c.first.summary(), c.second.summary())).collect();
        assert_eq!(pairs, vec![("A", "B"), ("B", "C")]);
    }

    #[test]
    fn test_chain_scan_misses_non_adjacent_overlap() {
        // A overlaps C too, but only the adjacent A/B pair is reported
        let events = [
            event("C", (11, 0), (12, 0)),
            event("A", (8, 0), (12, 0)),
            event("B", (9, 0), (10, 0)),
        ];
        let conflicts = find_conflicts(&events);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].first.summary(), "A");
        assert_eq!(conflicts[0].second.summary(), "B");
        assert!(events[1].overlaps(&events[0]));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(find_conflicts(&[]).is_empty());
        assert!(find_conflicts(&[event("A", (9, 0), (10, 0))]).is_empty());
    }
}
