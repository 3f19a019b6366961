pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conflicts;
pub mod error;
pub mod grid;
pub mod report;
pub mod schedule;

// Re-export commonly used types
pub use calendar::{parse_calendar, write_calendar, Event, ParsedCalendar};
pub use config::Config;
pub use conflicts::{find_conflicts, Conflict};
pub use error::{AgendaError, CellRef};
pub use grid::{normalize_grid, search_grid, Grid, GridMatch};
pub use schedule::{
    extract_schedule_by_group, extract_schedule_single_sheet, GroupLayout, SingleSheetLayout,
    SlotTable, WeekdayShifts,
};
