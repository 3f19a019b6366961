use anyhow::{Context, Result};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AgendaError;
use crate::grid::address::column_index;
use crate::schedule::{GroupLayout, SingleSheetLayout, SlotTable, WeekdayShifts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// IANA zone used to localize timetable wall-clock times.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub by_group: GroupLayoutConfig,
    #[serde(default)]
    pub single_sheet: SingleSheetLayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupLayoutConfig {
    pub group_sheet: usize,
    pub label_column: String,
    pub first_label_row: u32,
    pub last_label_row: u32,
    pub date_row: u32,
    pub slot_row: u32,
    pub slots: BTreeMap<String, SlotConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSheetLayoutConfig {
    pub date_column: String,
    pub slot_row: u32,
    pub slots: BTreeMap<String, SlotConfig>,
    pub weekdays: BTreeMap<String, i64>,
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_slots() -> BTreeMap<String, SlotConfig> {
    SlotTable::ecn()
        .iter()
        .map(|(code, slot)| {
            let config = SlotConfig {
                start: slot.start.format("%H:%M").to_string(),
                end: slot.end.format("%H:%M").to_string(),
            };
            (code.to_string(), config)
        })
        .collect()
}

impl Default for GroupLayoutConfig {
    fn default() -> Self {
        Self {
            group_sheet: 0,
            label_column: "B".to_string(),
            first_label_row: 4,
            last_label_row: 20,
            date_row: 3,
            slot_row: 4,
            slots: default_slots(),
        }
    }
}

impl Default for SingleSheetLayoutConfig {
    fn default() -> Self {
        Self {
            date_column: "B".to_string(),
            slot_row: 2,
            slots: default_slots(),
            weekdays: WeekdayShifts::french().iter().map(|(name, shift)| (name.to_string(), shift)).collect(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            by_group: GroupLayoutConfig::default(),
            single_sheet: SingleSheetLayoutConfig::default(),
        }
    }
}

fn slot_table(slots: &BTreeMap<String, SlotConfig>) -> Result<SlotTable, AgendaError> {
    let mut table = SlotTable::new();
    for (code, slot) in slots {
        table.insert(code, &slot.start, &slot.end)?;
    }
    if table.is_empty() {
        return Err(AgendaError::Config("slot table is empty".to_string()));
    }
    Ok(table)
}

impl Config {
    /// Load the config at `path`, or from the platform config dir when none
    /// is given. A missing default config file is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => return Self::load_from(path),
            None => get_config_path()?,
        };

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz, AgendaError> {
        self.timezone
            .parse()
            .map_err(|_| AgendaError::Config(format!("unknown timezone '{}'", self.timezone)))
    }

    pub fn group_layout(&self) -> Result<GroupLayout, AgendaError> {
        let layout = &self.by_group;
        let label_column = column_index(&layout.label_column).ok_or_else(|| {
            AgendaError::Config(format!("'{}' is not a column name", layout.label_column))
        })?;
        if layout.first_label_row == 0 || layout.first_label_row > layout.last_label_row {
            return Err(AgendaError::Config(format!(
                "label rows {}..={} are empty",
                layout.first_label_row, layout.last_label_row
            )));
        }
        Ok(GroupLayout {
            group_sheet: layout.group_sheet,
            label_column,
            label_rows: layout.first_label_row..=layout.last_label_row,
            date_row: layout.date_row,
            slot_row: layout.slot_row,
            timezone: self.timezone()?,
            slots: slot_table(&layout.slots)?,
        })
    }

    /// Build the single-sheet layout, letting the caller override the date
    /// column and slot row.
    pub fn single_sheet_layout(
        &self,
        date_column: Option<&str>,
        slot_row: Option<u32>,
    ) -> Result<SingleSheetLayout, AgendaError> {
        let layout = &self.single_sheet;
        let mut single = SingleSheetLayout::new(
            date_column.unwrap_or(&layout.date_column),
            slot_row.unwrap_or(layout.slot_row),
        )?;
        single.timezone = self.timezone()?;
        single.slots = slot_table(&layout.slots)?;
        let mut weekdays = WeekdayShifts::new();
        for (name, shift) in &layout.weekdays {
            weekdays.insert(name, *shift);
        }
        single.weekdays = weekdays;
        Ok(single)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "agenda", "agenda")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
