//! Roster command handler

use std::process::ExitCode;

use gs_tools::core::registry::{CourseConfig, CourseStore, StoreError};

/// Print the stored roster of `id`, or of the default course
pub fn run(store: &CourseStore, id: Option<&str>) -> ExitCode {
    match load(store, id) {
        Ok(Some(course)) => {
            print_roster(&course);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("No course selected: pass --id or set a default course");
            ExitCode::SUCCESS
        }
        Err(
            e @ (StoreError::SettingsMissing(_)
            | StoreError::UnknownCourse(_)
            | StoreError::CourseMissing { .. }),
        ) => {
            println!("{e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn load(store: &CourseStore, id: Option<&str>) -> Result<Option<CourseConfig>, StoreError> {
    let settings = store.load_settings()?;
    let Some(identifier) = id.or(settings.default_course.as_deref()) else {
        return Ok(None);
    };
    store.load_course(&settings, identifier).map(Some)
}

fn print_roster(course: &CourseConfig) {
    println!(
        "{} (Gradescope course {}), {} students",
        course.identifier,
        course.gradescope_id,
        course.roster.len()
    );
    let width = course
        .roster
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, email) in course.roster.iter() {
        println!("  {name:<width$}  {email}");
    }
}
