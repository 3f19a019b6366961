use anyhow::{Context, Result};
use std::path::Path;

use super::emit_events;
use crate::cli::OutputArgs;
use crate::config::Config;
use crate::grid::{normalize_grid, search_grid};
use crate::schedule::{extract_schedule_by_group, extract_schedule_single_sheet};

pub fn normalize(workbook: &Path, output: Option<&Path>) -> Result<()> {
    let grid = normalize_grid(workbook, output)
        .with_context(|| format!("Failed to normalize {}", workbook.display()))?;
    for sheet in grid.sheets() {
        println!("  {}: {} cells", sheet.name(), sheet.cells().count());
    }
    if let Some(output) = output {
        println!("Saved normalized workbook to {}", output.display());
    }
    Ok(())
}

pub fn search(workbook: &Path, text: &str) -> Result<()> {
    let grid = normalize_grid(workbook, None)
        .with_context(|| format!("Failed to read {}", workbook.display()))?;
    let matches = search_grid(&grid, text)
        .with_context(|| format!("Failed to search {}", workbook.display()))?;
    if matches.is_empty() {
        println!("No cell contains '{}'.", text);
    }
    for found in matches {
        println!("  {}!{}  {}", found.sheet, found.coordinate(), found.value.replace('\n', " "));
    }
    Ok(())
}

pub fn by_group(
    config: &Config,
    workbook: &Path,
    course: &str,
    group: &str,
    types: &[String],
    output: &OutputArgs,
) -> Result<()> {
    let layout = config.group_layout()?;
    let grid = normalize_grid(workbook, None)
        .with_context(|| format!("Failed to read {}", workbook.display()))?;
    let types: Vec<&str> = types.iter().map(String::as_str).collect();
    let events = extract_schedule_by_group(&grid, course, group, &types, &layout)
        .with_context(|| format!("Failed to extract {} for group {} from {}", course, group, workbook.display()))?;
    emit_events(&events, output)
}

pub fn single_sheet(
    config: &Config,
    workbook: &Path,
    course: &str,
    date_column: Option<&str>,
    slot_row: Option<u32>,
    output: &OutputArgs,
) -> Result<()> {
    let layout = config.single_sheet_layout(date_column, slot_row)?;
    let grid = normalize_grid(workbook, None)
        .with_context(|| format!("Failed to read {}", workbook.display()))?;
    let events = extract_schedule_single_sheet(&grid, course, &layout)
        .with_context(|| format!("Failed to extract '{}' from {}", course, workbook.display()))?;
    emit_events(&events, output)
}
