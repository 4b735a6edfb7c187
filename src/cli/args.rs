//! CLI argument definitions for `gstools`

use clap::{builder::BoolishValueParser, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use gs_tools::config::ConfigOverrides;
use gs_tools::logger::Level;

/// CLI log level argument
///
/// Converts to lowercase strings for config storage and to `Level` for runtime use.
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&Level::from(*self), f)
    }
}

#[derive(Debug, Subcommand)]
pub enum SettingsSubcommand {
    /// Display a setting.
    ///
    /// Keys: `course_path`, `courses`, `default-course`, `default-to-newest`, `default-length`.
    Get {
        /// Setting to display
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Change a setting.
    Set {
        /// Setting to change
        #[arg(value_name = "KEY")]
        key: String,
        /// New value
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Reset a setting to its default.
    Unset {
        /// Setting to reset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset every preference to its default, keeping registered courses (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a course.
    ///
    /// Without options, walks through picking a Gradescope course and building a
    /// roster from a CSV export or from Piazza. With options, registers a course
    /// directly from a roster CSV.
    Config {
        /// Identifier to use for the course
        #[arg(short, long = "id", value_name = "ID")]
        id: Option<String>,

        /// Path to roster CSV exported from Piazza
        #[arg(short, long, value_name = "FILE")]
        roster: Option<PathBuf>,

        /// Gradescope course id
        #[arg(short, long, value_name = "GRADESCOPE_ID")]
        gradescope: Option<String>,

        /// List possible options for Gradescope ids
        #[arg(short, long)]
        list: bool,
    },
    /// Extend assignment deadlines for students.
    Extend {
        /// Course identifier (defaults to the default course)
        #[arg(short, long = "id", value_name = "ID")]
        id: Option<String>,

        /// Student names, quoted, as "First Last"
        #[arg(value_name = "NAMES")]
        names: Vec<String>,

        /// Number of days after the deadline to extend the assignment. Does not stack with other extensions.
        #[arg(short, long, value_name = "DAYS")]
        days: Option<u32>,

        /// String for assignment titles to contain (e.g. -s hw4 to extend every assignment with 'hw4' in the title)
        #[arg(short, long = "string", value_name = "STRING", required = true)]
        string: String,
    },
    /// Show or change course settings.
    ///
    /// If no subcommand is provided, displays all settings.
    Settings {
        #[command(subcommand)]
        subcommand: Option<SettingsSubcommand>,
    },
    /// Show the stored roster of a course.
    Roster {
        /// Course identifier (defaults to the default course)
        #[arg(short, long = "id", value_name = "ID")]
        id: Option<String>,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "gstools",
    about = "Gradescope roster and extension helper",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug", global = true)]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Directory holding settings.toml and course rosters (this run only)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override config logging level
    #[arg(long = "config-level", value_enum, global = true)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH", global = true)]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new(), global = true)]
    pub config_verbose: Option<bool>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self
                .config_log_file
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            verbose: self.config_verbose,
            data_dir: self
                .data_dir
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
        }
    }
}
