use anyhow::{Context, Result};
use log::debug;
use std::fs::File;

use crate::calendar::{self, Event};
use crate::cli::{Cli, Commands, OutputArgs};
use crate::config::Config;
use crate::report;

pub mod calendar_commands;
pub mod schedule;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    debug!("Using config: {:?}", config);

    match cli.command {
        Commands::Normalize { workbook, output } => schedule::normalize(&workbook, output.as_deref()),
        Commands::Search { workbook, text } => schedule::search(&workbook, &text),
        Commands::ByGroup { workbook, course, group, types, output } => {
            schedule::by_group(&config, &workbook, &course, &group, &types, &output)
        }
        Commands::SingleSheet { workbook, course, date_column, slot_row, output } => {
            schedule::single_sheet(&config, &workbook, &course, date_column.as_deref(), slot_row, &output)
        }
        Commands::Events { calendar, output } => calendar_commands::events(&calendar, &output),
        Commands::Conflicts { calendars, csv, json } => {
            calendar_commands::conflicts(&calendars, csv.as_deref(), json)
        }
    }
}

/// Print events, and write them to the ICS/CSV files the user asked for.
pub(crate) fn emit_events(events: &[Event], output: &OutputArgs) -> Result<()> {
    if output.json {
        println!("{}", report::events_json(events)?);
    } else {
        print_events(events);
    }

    if let Some(path) = &output.ics {
        calendar::write_calendar(events, path)?;
        println!("Wrote {} events to {}", events.len(), path.display());
    }
    if let Some(path) = &output.csv {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        report::write_events_csv(events, file)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} events to {}", events.len(), path.display());
    }
    Ok(())
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }
    for event in events {
        println!(
            "  {} {}-{}  {}",
            event.start().format("%a %d/%m/%y"),
            event.start().format("%H:%M"),
            event.end().format("%H:%M"),
            event.summary()
        );
        if let Some(location) = event.location() {
            println!("    Location: {}", location);
        }
    }
}
