//! Consolidated timetables: one sheet, a Monday date per row block and a
//! weekday/slot header above each column.

use chrono::Duration;
use log::{debug, info};

use super::{clean_text, date_at, localize, slot_at, SingleSheetLayout};
use crate::calendar::Event;
use crate::error::{AgendaError, CodeTable, Result};
use crate::grid::{search_grid, Grid};

/// Extract every session whose cell contains `course`.
///
/// Add trailing spaces to `course` to tell apart two courses sharing a
/// prefix. The date is the Monday found in `layout.date_column` on the
/// match's row, shifted by the weekday named on row `slot_row - 1` of the
/// match's column; the slot code comes from row `slot_row`.
pub fn extract_schedule_single_sheet(
    grid: &Grid,
    course: &str,
    layout: &SingleSheetLayout,
) -> Result<Vec<Event>> {
    let weekday_row = layout.slot_row.checked_sub(1).filter(|row| *row > 0).ok_or_else(|| {
        AgendaError::Config(format!("slot row {} has no weekday row above it", layout.slot_row))
    })?;

    let mut events = Vec::new();
    for found in search_grid(grid, course)? {
        let sheet = grid.sheet(&found.sheet).ok_or_else(|| AgendaError::NotFound {
            what: format!("sheet '{}'", found.sheet),
            scope: "workbook".to_string(),
        })?;

        let monday = date_at(sheet, found.row, layout.date_column, "week date")?;

        let weekday_at = sheet.cell_ref(weekday_row, found.col);
        let weekday = sheet.get(weekday_row, found.col).to_string();
        let weekday = weekday.trim();
        if weekday.is_empty() {
            return Err(AgendaError::NotFound {
                what: "weekday header".to_string(),
                scope: weekday_at.to_string(),
            });
        }
        let shift = layout.weekdays.get(weekday).ok_or_else(|| AgendaError::InvalidSlot {
            table: CodeTable::Weekday,
            code: weekday.to_string(),
            at: weekday_at.clone(),
        })?;
        let date = Duration::try_days(shift)
            .and_then(|offset| monday.checked_add_signed(offset))
            .ok_or_else(|| {
                AgendaError::Config(format!(
                    "weekday '{weekday}' shifts {monday} by {shift} days, out of the calendar range"
                ))
            })?;

        let slot = slot_at(sheet, layout.slot_row, found.col, &layout.slots)?;
        let at = found.cell_ref();
        let start = localize(layout.timezone, date, slot.start, &at)?;
        let end = localize(layout.timezone, date, slot.end, &at)?;

        let summary = clean_text(&found.value);
        debug!("{} -> {} {} {}", at, date, weekday, summary);
        events.push(Event::new(summary, start, end)?);
    }

    info!("Extracted {} sessions matching '{}'", events.len(), course.trim_end());
    Ok(events)
}
