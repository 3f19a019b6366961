use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// agenda - turn timetable spreadsheets and ICS exports into one calendar and
/// spot the clashes
#[derive(Debug, Parser)]
#[command(name = "agenda")]
#[command(about = "Extract timetable sessions and detect calendar conflicts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Unmerge every merged range, copying its top-left value into each cell
    Normalize {
        /// Workbook to read
        #[arg(required = true)]
        workbook: PathBuf,

        /// Where to save the normalized copy
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the cells containing a string (case-sensitive)
    Search {
        #[arg(required = true)]
        workbook: PathBuf,

        #[arg(required = true)]
        text: String,
    },

    /// Extract a group's sessions from a per-group timetable
    #[command(alias = "group")]
    ByGroup {
        #[arg(required = true)]
        workbook: PathBuf,

        /// Course short name (e.g. FLUID)
        #[arg(long, required = true)]
        course: String,

        /// Group label as written in the label column (e.g. G1)
        #[arg(long, required = true)]
        group: String,

        /// Accepted session types
        #[arg(long, value_delimiter = ',', default_value = "TP,TD,CM")]
        types: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract a course's sessions from a single-sheet timetable
    #[command(alias = "sheet")]
    SingleSheet {
        #[arg(required = true)]
        workbook: PathBuf,

        /// Course name; keep trailing spaces to disambiguate shared prefixes
        #[arg(long, required = true)]
        course: String,

        /// Column holding each week's Monday date
        #[arg(long)]
        date_column: Option<String>,

        /// Row holding slot codes (weekday names sit on the row above)
        #[arg(long)]
        slot_row: Option<u32>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List upcoming events of an ICS file
    Events {
        #[arg(required = true)]
        calendar: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Report overlapping events across one or more ICS files
    Conflicts {
        #[arg(required = true, num_args = 1..)]
        calendars: Vec<PathBuf>,

        /// Write the conflicts as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the conflicts as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Write the events as an ICS file
    #[arg(long)]
    pub ics: Option<PathBuf>,

    /// Write the events as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the events as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
