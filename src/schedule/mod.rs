//! Timetable extraction from normalized grids.
//
// Cell coordinates carry meaning in institutional timetables: a header row
// holds dates, another holds slot codes, a column labels student groups.
// Those positions live in layout descriptors so that extractors never
// hardcode them.

mod by_group;
mod single_sheet;

pub use by_group::extract_schedule_by_group;
pub use single_sheet::extract_schedule_single_sheet;

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AgendaError, CellRef, CodeTable, Result};
use crate::grid::address::{column_index, column_letters};
use crate::grid::{from_excel_serial, CellValue, Sheet};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A named time-of-day interval such as `M1` = 08:00-10:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Slot code to time-of-day interval.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlotTable {
    slots: BTreeMap<String, Slot>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot from `HH:MM` strings.
    pub fn insert(&mut self, code: &str, start: &str, end: &str) -> Result<()> {
        let parse = |s: &str| {
            NaiveTime::parse_from_str(s.trim(), "%H:%M")
                .map_err(|e| AgendaError::Config(format!("slot {code}: invalid time '{s}': {e}")))
        };
        let slot = Slot { start: parse(start)?, end: parse(end)? };
        if slot.start >= slot.end {
            return Err(AgendaError::Config(format!(
                "slot {code}: start {start} is not before end {end}"
            )));
        }
        self.slots.insert(code.trim().to_string(), slot);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<Slot> {
        self.slots.get(code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(code, slot)| (code.as_str(), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Morning and afternoon slots used by the ECN timetables.
    pub fn ecn() -> Self {
        let slot = |h1, m1, h2, m2| Slot {
            start: NaiveTime::from_hms_opt(h1, m1, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(h2, m2, 0).unwrap_or_default(),
        };
        let slots = [
            ("M1", slot(8, 0, 10, 0)),
            ("M2", slot(10, 15, 12, 15)),
            ("S1", slot(13, 45, 15, 45)),
            ("S2", slot(16, 0, 18, 0)),
        ];
        Self { slots: slots.into_iter().map(|(code, s)| (code.to_string(), s)).collect() }
    }
}

/// Weekday name to day offset from the week's Monday.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeekdayShifts {
    shifts: BTreeMap<String, i64>,
}

impl WeekdayShifts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, offset: i64) {
        self.shifts.insert(name.trim().to_string(), offset);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.shifts.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.shifts.iter().map(|(name, offset)| (name.as_str(), *offset))
    }

    pub fn french() -> Self {
        let mut shifts = Self::new();
        for (offset, name) in ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi"].iter().enumerate() {
            shifts.insert(name, offset as i64);
        }
        shifts
    }
}

/// Where things live in a per-group, multi-column timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    /// Sheet scanned for the group label.
    pub group_sheet: usize,
    pub label_column: u32,
    pub label_rows: RangeInclusive<u32>,
    pub date_row: u32,
    pub slot_row: u32,
    pub timezone: Tz,
    pub slots: SlotTable,
}

impl Default for GroupLayout {
    fn default() -> Self {
        Self {
            group_sheet: 0,
            label_column: 2,
            label_rows: 4..=20,
            date_row: 3,
            slot_row: 4,
            timezone: chrono_tz::Europe::Paris,
            slots: SlotTable::ecn(),
        }
    }
}

/// Where things live in a consolidated single-sheet timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleSheetLayout {
    /// Column holding each week's Monday date.
    pub date_column: u32,
    /// Row holding slot codes; the weekday names sit on the row above.
    pub slot_row: u32,
    pub timezone: Tz,
    pub slots: SlotTable,
    pub weekdays: WeekdayShifts,
}

impl SingleSheetLayout {
    pub fn new(date_column: &str, slot_row: u32) -> Result<Self> {
        let date_column = column_index(date_column).ok_or_else(|| {
            AgendaError::Config(format!("'{date_column}' is not a column name"))
        })?;
        if slot_row < 2 {
            return Err(AgendaError::Config(format!(
                "slot row {slot_row} leaves no room for the weekday row above it"
            )));
        }
        Ok(Self {
            date_column,
            slot_row,
            timezone: chrono_tz::Europe::Paris,
            slots: SlotTable::ecn(),
            weekdays: WeekdayShifts::french(),
        })
    }

    pub fn date_column_letters(&self) -> String {
        column_letters(self.date_column)
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn clean_text(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Combine a civil date and wall-clock time in `tz`. Times falling in a DST
/// gap are rejected; folded times take the earlier instant.
pub(crate) fn localize(tz: Tz, date: NaiveDate, time: NaiveTime, at: &CellRef) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(time)).earliest().ok_or_else(|| {
        AgendaError::malformed_cell(at, format!("{date} {time} does not exist in {tz}"))
    })
}

fn parse_date_token(token: &str) -> Option<NaiveDate> {
    ["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
}

/// Parse a header such as `"Lundi 10/03/25"`, `"10/03/2025"` or
/// `"2025-03-10 00:00:00"`: the date token may follow a day name.
pub(crate) fn parse_header_date(text: &str) -> Option<NaiveDate> {
    let mut tokens = text.split_whitespace();
    let first = tokens.next()?;
    parse_date_token(first).or_else(|| tokens.next().and_then(parse_date_token))
}

/// Read a date from a cell holding a native date, an Excel serial number,
/// or date text.
pub(crate) fn cell_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(dt) => Some(dt.date()),
        CellValue::Number(serial) => from_excel_serial(*serial).map(|dt| dt.date()),
        CellValue::Text(text) => parse_header_date(text),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Read a date cell, reporting a missing or unreadable value at its address.
pub(crate) fn date_at(sheet: &Sheet, row: u32, col: u32, what: &str) -> Result<NaiveDate> {
    let at = sheet.cell_ref(row, col);
    let value = sheet.get(row, col);
    if value.is_empty() {
        return Err(AgendaError::NotFound { what: what.to_string(), scope: at.to_string() });
    }
    cell_date(value)
        .ok_or_else(|| AgendaError::malformed_cell(&at, format!("cannot read a date from '{value}'")))
}

/// Read the slot code at `(row, col)` and look it up.
pub(crate) fn slot_at(sheet: &Sheet, row: u32, col: u32, slots: &SlotTable) -> Result<Slot> {
    let at = sheet.cell_ref(row, col);
    let code = match sheet.get(row, col) {
        CellValue::Empty => {
            return Err(AgendaError::NotFound { what: "slot code".to_string(), scope: at.to_string() })
        }
        value => value.to_string(),
    };
    let code = code.trim();
    slots
        .get(code)
        .ok_or_else(|| AgendaError::InvalidSlot { table: CodeTable::Slot, code: code.to_string(), at })
}
