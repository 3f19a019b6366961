//! Calendar codec: the event record and its ICS import/export.

mod calendar_export;
mod calendar_import;
mod calendar_types;
mod calendar_validation;

pub use calendar_export::*;
pub use calendar_import::*;
pub use calendar_types::*;
pub use calendar_validation::{escape_text, unescape_text, SkippedComponent};
