//! Workbook snapshots: every sheet's cell values plus its merged ranges.
//
// Reading goes through calamine with merged regions loaded; writing goes
// through rust_xlsxwriter. Both sides use 1-based coordinates here while the
// libraries themselves are 0-based.

pub mod address;
mod normalize;
mod search;

pub use normalize::{normalize_grid, normalize_workbook};
pub use search::{search_grid, search_sheet, GridMatch};

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use serde::Serialize;

use crate::error::{AgendaError, CellRef, Result};
use address::coordinate;

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(naive) => CellValue::Date(naive),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .map(CellValue::Date)
                .unwrap_or_else(|_| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
        }
    }
}

/// A merged rectangle, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRange {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl MergedRange {
    pub fn new(min_row: u32, min_col: u32, max_row: u32, max_col: u32) -> Self {
        Self { min_row, min_col, max_row, max_col }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }

    pub fn overlaps(&self, other: &MergedRange) -> bool {
        self.min_row <= other.max_row
            && other.min_row <= self.max_row
            && self.min_col <= other.max_col
            && other.min_col <= self.max_col
    }

    pub fn is_single_cell(&self) -> bool {
        self.min_row == self.max_row && self.min_col == self.max_col
    }

    /// Bounds are 1-based and not inverted.
    pub fn is_well_formed(&self) -> bool {
        self.min_row >= 1
            && self.min_col >= 1
            && self.min_row <= self.max_row
            && self.min_col <= self.max_col
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| (row, col)))
    }
}

impl fmt::Display for MergedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coordinate(self.min_row, self.min_col),
            coordinate(self.max_row, self.max_col)
        )
    }
}

/// One sheet of a workbook. Cells are kept in row-major order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    merged: Vec<MergedRange>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY)
    }

    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    /// Convenience for building fixtures and headers.
    pub fn set_text(&mut self, row: u32, col: u32, text: &str) {
        self.set(row, col, CellValue::Text(text.to_string()));
    }

    /// Non-empty cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &CellValue)> {
        self.cells.iter().map(|(pos, value)| (*pos, value))
    }

    pub fn merged_ranges(&self) -> &[MergedRange] {
        &self.merged
    }

    pub fn add_merged(&mut self, range: MergedRange) {
        self.merged.push(range);
    }

    pub fn cell_ref(&self, row: u32, col: u32) -> CellRef {
        CellRef::new(&self.name, row, col)
    }
}

/// Every sheet of a workbook, in workbook order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    sheets: Vec<Sheet>,
}

impl Grid {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_at(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Snapshot an xlsx workbook, including its merged ranges.
    pub fn load(path: &Path) -> Result<Self> {
        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| AgendaError::spreadsheet(path, e))?;
        workbook
            .load_merged_regions()
            .map_err(|e| AgendaError::spreadsheet(path, format!("failed to load merged regions: {e}")))?;

        let mut grid = Grid::default();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| AgendaError::spreadsheet(path, format!("failed to read sheet '{name}': {e}")))?;

            let mut sheet = Sheet::new(name.as_str());
            if let Some((row0, col0)) = range.start() {
                for (r, c, data) in range.used_cells() {
                    sheet.set(row0 + r as u32 + 1, col0 + c as u32 + 1, CellValue::from(data));
                }
            }

            let regions = workbook
                .worksheet_merge_cells(&name)
                .unwrap_or(Ok(Vec::new()))
                .map_err(|e| AgendaError::spreadsheet(path, format!("failed to read merges of '{name}': {e}")))?;
            for dims in regions {
                sheet.add_merged(MergedRange::new(
                    dims.start.0 + 1,
                    dims.start.1 + 1,
                    dims.end.0 + 1,
                    dims.end.1 + 1,
                ));
            }

            debug!(
                "Loaded sheet '{}' with {} cells and {} merged ranges",
                sheet.name,
                sheet.cells.len(),
                sheet.merged.len()
            );
            grid.push_sheet(sheet);
        }

        info!("Loaded {} sheets from {}", grid.sheets.len(), path.display());
        Ok(grid)
    }

    /// Write the snapshot back to an xlsx file. Merged ranges are recreated
    /// with their top-left value.
    pub fn save(&self, path: &Path) -> Result<()> {
        let xlsx_err = |e: rust_xlsxwriter::XlsxError| AgendaError::spreadsheet(path, e);
        let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm");
        let plain = Format::new();
        let mut out = XlsxWorkbook::new();

        for sheet in &self.sheets {
            let worksheet = out.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(xlsx_err)?;

            for range in &sheet.merged {
                if range.is_single_cell() {
                    continue;
                }
                worksheet
                    .merge_range(
                        range.min_row - 1,
                        (range.min_col - 1) as u16,
                        range.max_row - 1,
                        (range.max_col - 1) as u16,
                        "",
                        &plain,
                    )
                    .map_err(xlsx_err)?;
            }

            for (&(row, col), value) in &sheet.cells {
                let covered = sheet
                    .merged
                    .iter()
                    .any(|r| r.contains(row, col) && (r.min_row, r.min_col) != (row, col));
                if covered {
                    continue;
                }
                let (r, c) = (row - 1, (col - 1) as u16);
                let written = match value {
                    CellValue::Empty => continue,
                    CellValue::Text(s) => worksheet.write_string(r, c, s),
                    CellValue::Number(n) => worksheet.write_number(r, c, *n),
                    CellValue::Bool(b) => worksheet.write_boolean(r, c, *b),
                    CellValue::Date(dt) => {
                        worksheet.write_number_with_format(r, c, excel_serial(dt), &date_format)
                    }
                };
                written.map_err(xlsx_err)?;
            }
        }

        out.save(path).map_err(xlsx_err)?;
        info!("Saved workbook to {}", path.display());
        Ok(())
    }
}

/// Days since the 1900 date system epoch, as Excel stores dates.
pub(crate) fn excel_serial(dt: &NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (*dt - epoch).num_seconds() as f64 / 86_400.0
}

/// Inverse of [`excel_serial`].
pub(crate) fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::seconds(seconds))
}
