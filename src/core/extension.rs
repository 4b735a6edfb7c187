//! Apply deadline extensions to students named on the command line.

use std::io::{self, Write};

use crate::core::registry::{CourseConfig, CourseStore, StoreError};
use crate::core::roster::Roster;
use crate::core::settings::Settings;
use crate::platforms::{Assignment, GradingPlatform, PlatformError};

/// Errors from the extension command
#[derive(Debug, thiserror::Error)]
pub enum ExtendError {
    /// No course has been registered yet
    #[error("No courses found, make sure you run `gstools config` first!")]
    NoCourses,
    /// No student names were given
    #[error("No student names given, nothing to extend")]
    NoNames,
    /// No `--id` and no default course
    #[error("No course selected: pass --id or set a default course")]
    NoCourseSelected,
    /// Registry failure
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Platform failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Writing the progress listing failed
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl ExtendError {
    /// Whether this is a user-facing precondition failure rather than a
    /// failure while talking to a platform.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoCourses
                | Self::NoNames
                | Self::NoCourseSelected
                | Self::Store(
                    StoreError::SettingsMissing(_)
                        | StoreError::UnknownCourse(_)
                        | StoreError::CourseMissing { .. }
                )
        )
    }
}

/// Course, length and students for one extension run
#[derive(Debug, Clone)]
pub struct ExtensionPlan {
    /// Target course
    pub course: CourseConfig,
    /// Days past the original deadline
    pub days: u32,
    /// Student names as typed, in order
    pub names: Vec<String>,
}

/// Outcome of one roster lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Name as typed, lower-cased
    pub name: String,
    /// Roster email, if the name was found
    pub email: Option<String>,
}

/// What an extension run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionReport {
    /// Assignments matched by the title filter
    pub assignments: Vec<Assignment>,
    /// Students extended, as (name, email), in the order given
    pub extended: Vec<(String, String)>,
    /// Names not found in the roster
    pub skipped: Vec<String>,
}

/// Check the preconditions of an extension run and load its course.
///
/// `course_id` falls back to the default course and `days` to
/// `default-length`.
///
/// # Errors
/// Returns a precondition error (see [`ExtendError::is_precondition`]) when no
/// course is registered, no names were given, or the course cannot be found.
pub fn plan_extensions(
    store: &CourseStore,
    settings: &Settings,
    course_id: Option<&str>,
    names: &[String],
    days: Option<u32>,
) -> Result<ExtensionPlan, ExtendError> {
    if settings.courses.is_empty() {
        return Err(ExtendError::NoCourses);
    }
    if names.is_empty() {
        return Err(ExtendError::NoNames);
    }
    let identifier = course_id
        .or(settings.default_course.as_deref())
        .ok_or(ExtendError::NoCourseSelected)?;
    let course = store.load_course(settings, identifier)?;

    Ok(ExtensionPlan {
        course,
        days: days.unwrap_or(settings.default_length),
        names: names.to_vec(),
    })
}

/// Look up each name in the roster, lower-casing it and nothing more
#[must_use]
pub fn resolve_names(roster: &Roster, names: &[String]) -> Vec<Resolution> {
    names
        .iter()
        .map(|raw| {
            let name = raw.to_lowercase();
            let email = roster.get(&name).map(str::to_string);
            Resolution { name, email }
        })
        .collect()
}

/// Extend every matching assignment for every resolved student.
///
/// Each request asks for a deadline `plan.days` days past the assignment's
/// original deadline, replacing any earlier extension. Names missing from the
/// roster are reported to `out` and skipped, even when no assignment matches.
/// Progress is written to `out`.
///
/// # Errors
/// Returns the first platform error; requests already sent are not undone.
pub fn apply_extensions<W: Write>(
    grading: &dyn GradingPlatform,
    plan: &ExtensionPlan,
    title_filter: &str,
    out: &mut W,
) -> Result<ExtensionReport, ExtendError> {
    let mut report = ExtensionReport::default();
    let mut students = Vec::new();
    for resolution in resolve_names(&plan.course.roster, &plan.names) {
        match resolution.email {
            Some(email) => students.push((resolution.name, email)),
            None => {
                writeln!(out, "could not find {} in the roster", resolution.name)?;
                crate::warn!("could not find {} in the roster", resolution.name);
                report.skipped.push(resolution.name);
            }
        }
    }

    let course_id = plan.course.gradescope_id.to_string();
    report.assignments = grading.find_assignments(&course_id, title_filter)?;
    if report.assignments.is_empty() {
        crate::warn!("No assignments in {} contain '{title_filter}'", plan.course.identifier);
        return Ok(report);
    }

    writeln!(
        out,
        "Extending {} assignment(s) by {} day(s):",
        report.assignments.len(),
        plan.days
    )?;
    for assignment in &report.assignments {
        writeln!(out, "  {}", assignment.title)?;
    }

    for (name, email) in students {
        writeln!(out, "{name} {email}")?;
        for assignment in &report.assignments {
            crate::debug!("Extending {} for {email} by {} day(s)", assignment.title, plan.days);
            grading.apply_extension(&course_id, assignment, &email, plan.days)?;
        }
        report.extended.push((name, email));
    }

    crate::info!(
        "Extended {} student(s) on {} assignment(s), skipped {}",
        report.extended.len(),
        report.assignments.len(),
        report.skipped.len()
    );
    Ok(report)
}
