//! Extend command handler

use std::io;
use std::process::ExitCode;

use gs_tools::config::Config;
use gs_tools::core::extension::{apply_extensions, plan_extensions, ExtendError};
use gs_tools::core::registry::CourseStore;
use gs_tools::error;

use super::connect_gradescope;

/// Extend every assignment whose title contains `title_filter` for `names`
pub fn run(
    store: &CourseStore,
    config: &Config,
    id: Option<&str>,
    names: &[String],
    days: Option<u32>,
    title_filter: &str,
) -> ExitCode {
    match extend(store, config, id, names, days, title_filter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_precondition() => {
            println!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Extension failed: {e}");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn extend(
    store: &CourseStore,
    config: &Config,
    id: Option<&str>,
    names: &[String],
    days: Option<u32>,
    title_filter: &str,
) -> Result<(), ExtendError> {
    let settings = store.load_settings()?;
    let plan = plan_extensions(store, &settings, id, names, days)?;
    let client = connect_gradescope(config)?;
    let report = apply_extensions(&client, &plan, title_filter, &mut io::stdout().lock())?;
    if !report.extended.is_empty() {
        println!(
            "✓ Extended {} student(s) on {} assignment(s)",
            report.extended.len(),
            report.assignments.len()
        );
    }
    Ok(())
}
