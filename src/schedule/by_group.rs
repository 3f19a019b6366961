//! Per-group timetables: one column per (day, slot), one row per cohort.

use log::{debug, info, warn};

use super::{date_at, localize, slot_at, GroupLayout};
use crate::calendar::Event;
use crate::error::{AgendaError, Result};
use crate::grid::address::coordinate;
use crate::grid::{search_grid, Grid};

/// Extract the sessions of `course` for `group` whose type (`TP`, `TD`,
/// `CM`, ...) is one of `course_types`.
///
/// The group row is looked up in `layout.label_column`; when several rows
/// carry the group name the last one wins and a warning lists them all.
/// Only matches on that row are kept. Each session takes its date from
/// `layout.date_row` and its slot code from `layout.slot_row` in the same
/// column.
pub fn extract_schedule_by_group(
    grid: &Grid,
    course: &str,
    group: &str,
    course_types: &[&str],
    layout: &GroupLayout,
) -> Result<Vec<Event>> {
    let groups_row = find_group_row(grid, group, layout)?;
    debug!("Group '{}' is on row {}", group, groups_row);

    let mut events = Vec::new();
    for found in search_grid(grid, course)? {
        if found.row != groups_row {
            continue;
        }
        if !has_course_type(&found.value, course_types) {
            debug!("Skipping {}: '{}' is not one of {:?}", found.cell_ref(), found.value, course_types);
            continue;
        }

        let sheet = grid.sheet(&found.sheet).ok_or_else(|| AgendaError::NotFound {
            what: format!("sheet '{}'", found.sheet),
            scope: "workbook".to_string(),
        })?;
        let date = date_at(sheet, layout.date_row, found.col, "date header")?;
        let slot = slot_at(sheet, layout.slot_row, found.col, &layout.slots)?;

        let at = found.cell_ref();
        let start = localize(layout.timezone, date, slot.start, &at)?;
        let end = localize(layout.timezone, date, slot.end, &at)?;
        events.push(Event::new(format!("{} Grp {}", found.value, group), start, end)?);
    }

    info!("Extracted {} sessions of {} for group {}", events.len(), course, group);
    Ok(events)
}

fn find_group_row(grid: &Grid, group: &str, layout: &GroupLayout) -> Result<u32> {
    let sheet = grid.sheet_at(layout.group_sheet).ok_or_else(|| AgendaError::NotFound {
        what: format!("sheet #{}", layout.group_sheet),
        scope: "workbook".to_string(),
    })?;

    let rows: Vec<u32> = layout
        .label_rows
        .clone()
        .filter(|&row| {
            sheet
                .get(row, layout.label_column)
                .as_text()
                .is_some_and(|label| label.contains(group))
        })
        .collect();

    match rows.as_slice() {
        [] => Err(AgendaError::NotFound {
            what: format!("group '{group}'"),
            scope: format!(
                "'{}'!{}:{}",
                sheet.name(),
                coordinate(*layout.label_rows.start(), layout.label_column),
                coordinate(*layout.label_rows.end(), layout.label_column)
            ),
        }),
        [row] => Ok(*row),
        [.., last] => {
            warn!("Group '{}' matches rows {:?} on sheet '{}', using row {}", group, rows, sheet.name(), last);
            Ok(*last)
        }
    }
}

/// The cell's second whitespace token must start with one of the requested
/// types. The comparison is a substring test on its first two characters,
/// so `"TP1"` is accepted for `["TP"]`. A cell with a single token has no
/// type and is rejected.
fn has_course_type(cell: &str, course_types: &[&str]) -> bool {
    let Some(token) = cell.split_whitespace().nth(1) else {
        return false;
    };
    let prefix: String = token.chars().take(2).collect();
    course_types.iter().any(|kind| kind.contains(prefix.as_str()))
}
