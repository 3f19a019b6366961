use std::fmt;
use std::path::PathBuf;

use crate::grid::address::coordinate;

pub type Result<T> = std::result::Result<T, AgendaError>;

/// Location of a cell inside a workbook, printed as `'Sheet'!D5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    pub fn new(sheet: impl Into<String>, row: u32, col: u32) -> Self {
        Self { sheet: sheet.into(), row, col }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'!{}", self.sheet, coordinate(self.row, self.col))
    }
}

/// Which lookup table rejected a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeTable {
    Slot,
    Weekday,
}

impl fmt::Display for CodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeTable::Slot => f.write_str("slot"),
            CodeTable::Weekday => f.write_str("weekday"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgendaError {
    #[error("{what} not found in {scope}")]
    NotFound { what: String, scope: String },

    #[error("unknown {table} code '{code}' at {at}")]
    InvalidSlot { table: CodeTable, code: String, at: CellRef },

    #[error("malformed grid at {at}: {reason}")]
    MalformedGrid { at: String, reason: String },

    #[error("malformed calendar component {component}: {reason}")]
    MalformedCalendar { component: String, reason: String },

    #[error("event '{summary}' ends at {end} which is not after its start {start}")]
    InvalidInterval { summary: String, start: String, end: String },

    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot process workbook {}: {message}", path.display())]
    Spreadsheet { path: PathBuf, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AgendaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AgendaError::Io { path: path.into(), source }
    }

    pub(crate) fn spreadsheet(path: impl Into<PathBuf>, err: impl fmt::Display) -> Self {
        AgendaError::Spreadsheet { path: path.into(), message: err.to_string() }
    }

    pub(crate) fn malformed_cell(at: &CellRef, reason: impl Into<String>) -> Self {
        AgendaError::MalformedGrid { at: at.to_string(), reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_display() {
        let at = CellRef::new("EI1", 5, 4);
        assert_eq!(at.to_string(), "'EI1'!D5");
    }

    #[test]
    fn test_invalid_slot_message_names_cell() {
        let err = AgendaError::InvalidSlot {
            table: CodeTable::Weekday,
            code: "Dimanche".to_string(),
            at: CellRef::new("Planning", 1, 28),
        };
        assert_eq!(err.to_string(), "unknown weekday code 'Dimanche' at 'Planning'!AB1");
    }
}
