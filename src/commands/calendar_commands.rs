use anyhow::{Context, Result};
use log::warn;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::emit_events;
use crate::calendar::{parse_calendar, Event};
use crate::cli::OutputArgs;
use crate::conflicts::find_conflicts;
use crate::report;

fn read_events(path: &Path) -> Result<Vec<Event>> {
    let parsed = parse_calendar(path).with_context(|| format!("Failed to read {}", path.display()))?;
    for skipped in &parsed.skipped {
        warn!("{}: {}", path.display(), skipped);
    }
    Ok(parsed.events)
}

pub fn events(path: &Path, output: &OutputArgs) -> Result<()> {
    let events = read_events(path)?;
    emit_events(&events, output)
}

pub fn conflicts(paths: &[PathBuf], csv: Option<&Path>, json: bool) -> Result<()> {
    let mut events = Vec::new();
    for path in paths {
        events.extend(read_events(path)?);
    }

    let conflicts = find_conflicts(&events);
    if json {
        println!("{}", report::conflicts_json(&conflicts)?);
    } else if conflicts.is_empty() {
        println!("No conflicts among {} events.", events.len());
    } else {
        println!("Found {} conflicts:", conflicts.len());
        for conflict in &conflicts {
            println!(
                "  {} ({} - {})\n    overlaps {} ({} - {})",
                conflict.first.summary(),
                conflict.first.start().format("%d/%m/%y %H:%M"),
                conflict.first.end().format("%H:%M"),
                conflict.second.summary(),
                conflict.second.start().format("%d/%m/%y %H:%M"),
                conflict.second.end().format("%H:%M"),
            );
        }
    }

    if let Some(path) = csv {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        report::write_conflicts_csv(&conflicts, file)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
