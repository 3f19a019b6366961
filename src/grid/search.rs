//! Substring search over normalized grids.

use serde::Serialize;

use super::address::coordinate;
use super::{Grid, Sheet};
use crate::error::{AgendaError, CellRef, Result};

/// A text cell containing the searched string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridMatch {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
    pub value: String,
}

impl GridMatch {
    pub fn coordinate(&self) -> String {
        coordinate(self.row, self.col)
    }

    pub fn cell_ref(&self) -> CellRef {
        CellRef::new(&self.sheet, self.row, self.col)
    }
}

/// Find every text cell containing `needle` (case-sensitive), in sheet order
/// then row-major order. The grid must already be normalized.
pub fn search_grid(grid: &Grid, needle: &str) -> Result<Vec<GridMatch>> {
    let mut matches = Vec::new();
    for sheet in grid.sheets() {
        matches.extend(search_sheet(sheet, needle)?);
    }
    log::debug!("Found {} cells containing '{}'", matches.len(), needle);
    Ok(matches)
}

pub fn search_sheet(sheet: &Sheet, needle: &str) -> Result<Vec<GridMatch>> {
    if let Some(range) = sheet.merged_ranges().iter().find(|r| !r.is_single_cell()) {
        return Err(AgendaError::MalformedGrid {
            at: format!("'{}'!{}", sheet.name(), range),
            reason: "sheet still has merged ranges, normalize it before searching".to_string(),
        });
    }

    Ok(sheet
        .cells()
        .filter_map(|((row, col), value)| {
            let text = value.as_text()?;
            text.contains(needle).then(|| GridMatch {
                sheet: sheet.name().to_string(),
                row,
                col,
                value: text.to_string(),
            })
        })
        .collect())
}
