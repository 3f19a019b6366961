//! Merge normalization: copy each merged rectangle's top-left value into
//! every cell it covers, then drop the merge.

use std::path::Path;

use log::{debug, info};

use super::{Grid, MergedRange, Sheet};
use crate::error::{AgendaError, Result};

/// Load `path`, normalize every sheet, and optionally save the result to
/// `output`. The returned grid is usable whether or not it was saved.
pub fn normalize_grid(path: &Path, output: Option<&Path>) -> Result<Grid> {
    let grid = Grid::load(path)?;
    let normalized = normalize_workbook(&grid)?;
    if let Some(output) = output {
        normalized.save(output)?;
    }
    Ok(normalized)
}

/// Pure form of [`normalize_grid`]: the input grid is left untouched.
pub fn normalize_workbook(grid: &Grid) -> Result<Grid> {
    let sheets = grid.sheets().iter().map(normalize_sheet).collect::<Result<Vec<_>>>()?;
    Ok(Grid::new(sheets))
}

fn normalize_sheet(sheet: &Sheet) -> Result<Sheet> {
    validate_ranges(sheet)?;

    // Top-left values are captured before any cell is rewritten.
    let lookup: Vec<(MergedRange, _)> = sheet
        .merged_ranges()
        .iter()
        .map(|range| (*range, sheet.get(range.min_row, range.min_col).clone()))
        .collect();

    let mut normalized = Sheet::new(sheet.name());
    for ((row, col), value) in sheet.cells() {
        normalized.set(row, col, value.clone());
    }

    for (range, value) in lookup {
        debug!("Unmerging {}!{} with value '{}'", sheet.name(), range, value);
        for (row, col) in range.cells() {
            normalized.set(row, col, value.clone());
        }
    }

    info!("Normalized {} merged ranges on sheet '{}'", sheet.merged_ranges().len(), sheet.name());
    Ok(normalized)
}

fn validate_ranges(sheet: &Sheet) -> Result<()> {
    let ranges = sheet.merged_ranges();
    for (i, range) in ranges.iter().enumerate() {
        if !range.is_well_formed() {
            return Err(AgendaError::MalformedGrid {
                at: format!("'{}'!{}", sheet.name(), range),
                reason: "merged range has inverted or zero bounds".to_string(),
            });
        }
        if let Some(other) = ranges[i + 1..].iter().find(|other| range.overlaps(other)) {
            return Err(AgendaError::MalformedGrid {
                at: format!("'{}'!{}", sheet.name(), range),
                reason: format!("merged range overlaps {}", other),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellValue;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn timetable_sheet() -> Sheet {
        let mut sheet = Sheet::new("EI1");
        sheet.set_text(3, 3, "Lundi 10/03/25");
        sheet.add_merged(MergedRange::new(3, 3, 3, 6));
        sheet.set_text(5, 2, "G1");
        sheet.set_text(5, 4, "FLUID TP");
        sheet.add_merged(MergedRange::new(5, 4, 6, 4));
        sheet
    }

    #[test]
    fn test_every_cell_takes_top_left_value() -> Result<()> {
        let grid = Grid::new(vec![timetable_sheet()]);
        let normalized = normalize_workbook(&grid)?;
        let sheet = &normalized.sheets()[0];

        for col in 3..=6 {
            assert_eq!(sheet.get(3, col), &CellValue::Text("Lundi 10/03/25".into()));
        }
        assert_eq!(sheet.get(6, 4), &CellValue::Text("FLUID TP".into()));
        assert!(sheet.merged_ranges().is_empty());
        // untouched cells survive
        assert_eq!(sheet.get(5, 2), &CellValue::Text("G1".into()));
        // the input is not modified
        assert_eq!(grid.sheets()[0].merged_ranges().len(), 2);
        assert!(grid.sheets()[0].get(3, 4).is_empty());
        Ok(())
    }

    #[test]
    fn test_single_cell_range_is_noop() -> Result<()> {
        let mut sheet = Sheet::new("S");
        sheet.set_text(2, 2, "alone");
        sheet.add_merged(MergedRange::new(2, 2, 2, 2));
        let normalized = normalize_workbook(&Grid::new(vec![sheet]))?;
        let sheet = &normalized.sheets()[0];
        assert_eq!(sheet.get(2, 2), &CellValue::Text("alone".into()));
        assert_eq!(sheet.cells().count(), 1);
        Ok(())
    }

    #[test]
    fn test_empty_top_left_clears_range() -> Result<()> {
        let mut sheet = Sheet::new("S");
        sheet.set_text(2, 3, "stale");
        sheet.add_merged(MergedRange::new(2, 2, 2, 3));
        let normalized = normalize_workbook(&Grid::new(vec![sheet]))?;
        assert!(normalized.sheets()[0].get(2, 3).is_empty());
        Ok(())
    }

    #[test]
    fn test_overlapping_ranges_are_rejected() {
        let mut sheet = Sheet::new("S");
        sheet.add_merged(MergedRange::new(1, 1, 2, 2));
        sheet.add_merged(MergedRange::new(2, 2, 3, 3));
        let err = normalize_workbook(&Grid::new(vec![sheet])).unwrap_err();
        assert!(matches!(err, AgendaError::MalformedGrid { .. }));
        assert!(err.to_string().contains("'S'!A1:B2"));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut sheet = Sheet::new("S");
        sheet.add_merged(MergedRange::new(4, 1, 2, 1));
        let err = normalize_workbook(&Grid::new(vec![sheet])).unwrap_err();
        assert!(matches!(err, AgendaError::MalformedGrid { .. }));
    }

    #[test]
    fn test_normalize_grid_from_file_and_save() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("timetable.xlsx");
        let output = dir.path().join("ready4import.xlsx");
        Grid::new(vec![timetable_sheet()]).save(&input)?;

        let normalized = normalize_grid(&input, Some(&output))?;
        assert_eq!(normalized.sheets()[0].get(3, 6), &CellValue::Text("Lundi 10/03/25".into()));

        let reloaded = Grid::load(&output)?;
        let sheet = reloaded.sheet("EI1").unwrap();
        assert!(sheet.merged_ranges().is_empty());
        assert_eq!(sheet.get(6, 4), &CellValue::Text("FLUID TP".into()));
        Ok(())
    }
}
