//! Event record shared by spreadsheet extraction and ICS import/export.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{AgendaError, Result};

/// A timed event. `start < end` always holds; build one with [`Event::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    summary: String,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    location: Option<String>,
    description: Option<String>,
}

impl Event {
    pub fn new(summary: impl Into<String>, start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
        let summary = summary.into();
        if start >= end {
            return Err(AgendaError::InvalidInterval {
                summary,
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { summary, start, end, location: None, description: None })
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location.filter(|s| !s.is_empty());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|s| !s.is_empty());
        self
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    pub fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Half-open interval overlap: touching events do not overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.start < other.end && other.start < self.end
    }
}
