//! Command-line interface entry point for `gstools`

mod args;
mod commands;

use std::process::ExitCode;

use args::{Cli, Command};
use clap::Parser;
use gs_tools::config::Config;
use gs_tools::core::registry::CourseStore;
use gs_tools::info;
use gs_tools::logger::{enable_debug, enable_verbose, init_file_logging, set_level, Level};

fn main() -> ExitCode {
    let args = Cli::parse();

    // Load configuration once at startup and apply CLI overrides to it
    let mut config = Config::load();
    config.apply_overrides(&args.to_config_overrides());

    // CLI flag overrides config logging.level; fallback warn
    let mut level = args
        .log_level
        .map(Level::from)
        .or_else(|| Level::parse(&config.logging.level))
        .unwrap_or(Level::Warn);
    if args.debug_flag || level == Level::Debug {
        level = Level::Debug;
        enable_debug();
    }

    let verbose = args.verbose || config.logging.verbose;
    if verbose {
        enable_verbose();
    }
    set_level(level);

    // CLI flag wins, otherwise use config logging.file if set
    let config_log_path = (!config.logging.file.is_empty())
        .then(|| std::path::PathBuf::from(&config.logging.file));
    if let Some(log_path) = args.log_file.as_ref().or(config_log_path.as_ref()) {
        let display_path = log_path.to_string_lossy();
        if init_file_logging(log_path) {
            info!("File logging initialized at: {display_path}");
        } else {
            eprintln!("✗ Failed to initialize file logging at: {display_path}");
        }
    }

    let store = CourseStore::new(config.data_dir());
    info!("Using data directory {}", store.root().display());

    match args.command {
        Command::Config {
            id,
            roster,
            gradescope,
            list,
        } => commands::config::run(
            &store,
            &config,
            id.as_deref(),
            gradescope.as_deref(),
            roster.as_deref(),
            list,
        ),
        Command::Extend {
            id,
            names,
            days,
            string,
        } => commands::extend::run(&store, &config, id.as_deref(), &names, days, &string),
        Command::Settings { subcommand } => commands::settings::run(&store, &config, subcommand),
        Command::Roster { id } => commands::roster::run(&store, id.as_deref()),
    }
}
