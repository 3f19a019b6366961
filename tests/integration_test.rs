use agenda::calendar::{parse_calendar_at, write_calendar};
use agenda::grid::{normalize_grid, search_grid, CellValue, Grid, MergedRange, Sheet};
use agenda::schedule::{extract_schedule_by_group, extract_schedule_single_sheet, GroupLayout};
use agenda::{find_conflicts, AgendaError, Config};
use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::tempdir;

/// EI1-style timetable: dates on row 3 merged over each day's four slots,
/// slot codes on row 4, group labels in column B.
fn write_ei1_workbook(path: &Path) -> Result<()> {
    let mut sheet = Sheet::new("EI1");
    sheet.set_text(3, 4, "Lundi 10/03/25");
    sheet.add_merged(MergedRange::new(3, 4, 3, 7));
    for (offset, slot) in ["M1", "M2", "S1", "S2"].iter().enumerate() {
        sheet.set_text(4, 4 + offset as u32, slot);
    }
    sheet.set_text(5, 2, "G1");
    sheet.set_text(6, 2, "G2");
    sheet.set_text(5, 4, "FLUID TP");
    sheet.set_text(5, 5, "FLUID TP");
    sheet.add_merged(MergedRange::new(5, 5, 6, 5));
    sheet.set_text(5, 6, "MECA CM");
    sheet.add_merged(MergedRange::new(5, 6, 6, 7));
    Grid::new(vec![sheet]).save(path)?;
    Ok(())
}

#[test]
fn integration_test_by_group_from_xlsx() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("ei1.xlsx");
    let normalized_path = dir.path().join("ready4import.xlsx");
    write_ei1_workbook(&input)?;

    let grid = normalize_grid(&input, Some(&normalized_path))?;
    assert!(normalized_path.exists());
    assert_eq!(grid.sheets()[0].get(3, 7), &CellValue::Text("Lundi 10/03/25".into()));
    assert_eq!(search_grid(&grid, "MECA")?.len(), 4);

    let events = extract_schedule_by_group(&grid, "FLUID", "G1", &["TP"], &GroupLayout::default())?;
    let summaries: Vec<_> = events.iter().map(|e| e.summary()).collect();
    assert_eq!(summaries, vec!["FLUID TP Grp G1", "FLUID TP Grp G1"]);

    let paris = chrono_tz::Europe::Paris;
    assert_eq!(*events[0].start(), paris.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap());
    assert_eq!(*events[0].end(), paris.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap());
    assert_eq!(*events[1].start(), paris.with_ymd_and_hms(2025, 3, 10, 10, 15, 0).unwrap());

    let g2 = extract_schedule_by_group(&grid, "FLUID", "G2", &["TP"], &GroupLayout::default())?;
    assert_eq!(g2.len(), 1);
    assert_eq!(g2[0].summary(), "FLUID TP Grp G2");
    Ok(())
}

#[test]
fn integration_test_single_sheet_to_ics_and_conflicts() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("planning.xlsx");

    let mut sheet = Sheet::new("Planning");
    sheet.set_text(1, 3, "Mercredi");
    sheet.add_merged(MergedRange::new(1, 3, 1, 4));
    sheet.set_text(2, 3, "S1");
    sheet.set_text(2, 4, "S2");
    let monday = NaiveDate::from_ymd_opt(2031, 3, 10).unwrap().and_hms_opt(0, 0, 0).unwrap();
    sheet.set(3, 2, CellValue::Date(monday));
    sheet.set_text(3, 3, "ANGLAIS\n(TD)");
    sheet.set_text(3, 4, "ANGLAIS  (TD)");
    Grid::new(vec![sheet]).save(&input)?;

    let config = Config::default();
    let layout = config.single_sheet_layout(Some("B"), Some(2))?;
    let grid = normalize_grid(&input, None)?;
    let events = extract_schedule_single_sheet(&grid, "ANGLAIS", &layout)?;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].summary(), "ANGLAIS (TD)");
    assert_eq!(events[0].start().format("%Y-%m-%d %H:%M").to_string(), "2031-03-12 13:45");
    assert_eq!(events[1].start().format("%Y-%m-%d %H:%M").to_string(), "2031-03-12 16:00");
    assert!(find_conflicts(&events).is_empty());

    let ics = dir.path().join("anglais.ics");
    write_calendar(&events, &ics)?;
    let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let parsed = parse_calendar_at(&ics, now)?;
    assert_eq!(parsed.events.len(), 2);
    assert_eq!(parsed.events[1].end(), events[1].end());

    // a second copy of the same sessions clashes with the first
    let mut doubled = parsed.events.clone();
    doubled.extend(events);
    assert_eq!(find_conflicts(&doubled).len(), 2);
    Ok(())
}

#[test]
fn integration_test_missing_workbook() {
    let err = normalize_grid(Path::new("/nonexistent/timetable.xlsx"), None).unwrap_err();
    assert!(matches!(err, AgendaError::Spreadsheet { .. }));
    assert!(err.to_string().contains("/nonexistent/timetable.xlsx"));
}
