//! Course configuration flows: flag mode, `--list`, and the interactive setup.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::core::prompt::Prompt;
use crate::core::reconcile::{reconcile, Reconciliation};
use crate::core::registry::{validate_identifier, CourseConfig, CourseStore, GradingCourseId, StoreError};
use crate::core::roster::{read_roster_csv, Roster, RosterError};
use crate::core::settings::{DefaultUpdate, Registration, Settings};
use crate::platforms::{
    DiscussionClass, DiscussionPlatform, GradingCourse, GradingPlatform, PlatformError,
};

/// Errors from configuring a course
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Registry failure
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Roster export failure
    #[error(transparent)]
    Roster(#[from] RosterError),
    /// Platform failure
    #[error(transparent)]
    Platform(#[from] PlatformError),
    /// Terminal I/O failure, including closed input
    #[error("prompt failed: {0}")]
    Prompt(#[from] io::Error),
    /// Flag mode needs `--id`, `--gradescope` and `--roster` together
    #[error("missing required option {0} (flag mode needs --id, --gradescope and --roster)")]
    MissingArgument(&'static str),
    /// A selection menu would be empty
    #[error("no {0} found")]
    NothingToSelect(&'static str),
}

/// Operator message describing a change of default course, if any
#[must_use]
pub fn describe_default_update(identifier: &str, registration: &Registration) -> Option<String> {
    match registration.default {
        DefaultUpdate::Initial => Some(format!("No default course set, setting to {identifier}.")),
        DefaultUpdate::Newest => Some(format!("Setting {identifier} to the default course.")),
        DefaultUpdate::Unchanged => None,
    }
}

/// Menu lines for grading courses: name padded to the longest, then term and id
#[must_use]
pub fn course_menu(courses: &[GradingCourse]) -> Vec<String> {
    let width = courses.iter().map(|c| c.name.chars().count()).max().unwrap_or(0);
    courses
        .iter()
        .map(|c| format!("{:<width$}\t{}\t{}", c.name, c.term, c.id))
        .collect()
}

/// `--list` output: a header line, then `id  name  term` per course
#[must_use]
pub fn course_listing(courses: &[GradingCourse]) -> Vec<String> {
    const NAME_HEADER: &str = "Course Name";
    let width = courses
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(NAME_HEADER.len());
    let mut lines = vec![format!("ID\t{NAME_HEADER:<width$}\tTerm")];
    lines.extend(
        courses
            .iter()
            .map(|c| format!("{}\t{:<width$}\t{}", c.id, c.name, c.term)),
    );
    lines
}

/// Menu lines for discussion classes: number padded to the longest, then term
#[must_use]
pub fn class_menu(classes: &[DiscussionClass]) -> Vec<String> {
    let width = classes.iter().map(|c| c.number.chars().count()).max().unwrap_or(0);
    classes
        .iter()
        .map(|c| format!("{:<width$}\t{}", c.number, c.term))
        .collect()
}

/// Outcome of registering a course from command-line flags
#[derive(Debug, Clone)]
pub struct FlagSetup {
    /// The registered course
    pub course: CourseConfig,
    /// How the registration changed the settings
    pub registration: Registration,
    /// Default settings were written because none existed
    pub initialized: bool,
}

/// Load the settings document, writing the defaults first when there is none.
///
/// Returns the settings and whether the defaults were just written.
///
/// # Errors
/// Returns an error if the settings cannot be written or read back.
pub fn prepare_settings(store: &CourseStore) -> Result<(Settings, bool), StoreError> {
    let initialized = store.initialize_settings()?;
    Ok((store.load_settings()?, initialized))
}

/// Flag-mode configuration from a possibly empty data directory: initialize
/// the settings if needed, then register the course.
///
/// # Errors
/// Same as [`prepare_settings`] and [`configure_from_flags`].
pub fn configure_course(
    store: &CourseStore,
    identifier: Option<&str>,
    gradescope_id: Option<&str>,
    roster_path: Option<&Path>,
) -> Result<FlagSetup, SetupError> {
    let (mut settings, initialized) = prepare_settings(store)?;
    let (course, registration) =
        configure_from_flags(store, &mut settings, identifier, gradescope_id, roster_path)?;
    Ok(FlagSetup {
        course,
        registration,
        initialized,
    })
}

/// Register a course from command-line flags and a roster export.
///
/// # Errors
/// Returns [`SetupError::MissingArgument`] when a flag is absent, or the
/// roster/registry error that stopped the registration.
pub fn configure_from_flags(
    store: &CourseStore,
    settings: &mut Settings,
    identifier: Option<&str>,
    gradescope_id: Option<&str>,
    roster_path: Option<&Path>,
) -> Result<(CourseConfig, Registration), SetupError> {
    let identifier = identifier.ok_or(SetupError::MissingArgument("--id"))?;
    let gradescope_id = gradescope_id.ok_or(SetupError::MissingArgument("--gradescope"))?;
    let roster_path = roster_path.ok_or(SetupError::MissingArgument("--roster"))?;
    validate_identifier(identifier)?;

    let roster = read_roster_csv(roster_path)?;
    let course = CourseConfig::new(identifier, GradingCourseId::from(gradescope_id), roster);
    let registration = store.register_course(settings, &course)?;
    Ok((course, registration))
}

/// Build a roster for a grading course from a discussion-platform class.
///
/// The enrolled emails are fetched from the grading platform first, then the
/// class users from the discussion platform.
///
/// # Errors
/// Returns the first platform error.
pub fn roster_from_discussion(
    grading: &dyn GradingPlatform,
    grading_course_id: &str,
    discussion: &dyn DiscussionPlatform,
    class_id: &str,
) -> Result<Reconciliation, PlatformError> {
    let enrolled = grading.enrolled_emails(grading_course_id)?;
    let users = discussion.list_users(class_id)?;
    Ok(reconcile(&enrolled, &users))
}

/// Walk the operator through configuring a course and register it.
///
/// `connect_discussion` is only called when the operator has no roster export.
///
/// # Errors
/// Returns an error if a platform call fails, input is exhausted, or the
/// course cannot be registered.
pub fn interactive_setup<R, W, F>(
    prompt: &mut Prompt<R, W>,
    store: &CourseStore,
    settings: &mut Settings,
    grading: &dyn GradingPlatform,
    connect_discussion: F,
) -> Result<(CourseConfig, Registration), SetupError>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Result<Box<dyn DiscussionPlatform>, PlatformError>,
{
    let courses = grading.list_courses()?;
    if courses.is_empty() {
        return Err(SetupError::NothingToSelect("Gradescope courses"));
    }
    prompt.say("Enter the number (i) of the course to use for configuring:")?;
    let course = &courses[prompt.select(&course_menu(&courses))?];

    prompt.say(
        "\nDo you have csv of the roster?\n\
         You can obtain one by Manage Class->Enroll Students->Download Roster as CSV,\n\
         otherwise this will connect to piazza and try to build a roster that way.",
    )?;
    let roster = if prompt.confirm()? {
        read_roster_csv(ask_existing_path(prompt)?)?
    } else {
        roster_from_prompted_class(prompt, grading, &course.id, connect_discussion)?
    };

    let identifier = ask_identifier(prompt, settings)?;
    let config = CourseConfig::new(identifier, GradingCourseId::from(course.id.as_str()), roster);
    let registration = store.register_course(settings, &config)?;
    Ok((config, registration))
}

fn ask_existing_path<R: BufRead, W: Write>(prompt: &mut Prompt<R, W>) -> io::Result<PathBuf> {
    let mut path = PathBuf::from(prompt.ask("Enter path to roster csv: ")?.trim());
    while !path.exists() {
        path = PathBuf::from(prompt.ask("Path not found, try again: ")?.trim());
    }
    Ok(path)
}

fn roster_from_prompted_class<R, W, F>(
    prompt: &mut Prompt<R, W>,
    grading: &dyn GradingPlatform,
    grading_course_id: &str,
    connect_discussion: F,
) -> Result<Roster, SetupError>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Result<Box<dyn DiscussionPlatform>, PlatformError>,
{
    prompt.say("\nConnecting to piazza...")?;
    let discussion = connect_discussion()?;
    let classes: Vec<DiscussionClass> = discussion
        .list_classes()?
        .into_iter()
        .filter(|class| class.is_ta)
        .collect();
    if classes.is_empty() {
        return Err(SetupError::NothingToSelect(
            "Piazza classes where you are a TA",
        ));
    }

    prompt.say("Enter the number (i) of the piazza course to use:")?;
    let class = &classes[prompt.select(&class_menu(&classes))?];

    let result = roster_from_discussion(grading, grading_course_id, discussion.as_ref(), &class.id)?;
    result.report_unmatched(prompt.output_mut())?;
    Ok(result.roster)
}

fn ask_identifier<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    settings: &Settings,
) -> Result<String, SetupError> {
    loop {
        let identifier = prompt
            .ask("\nEnter an identifier to use for this course, no spaces:\n")?
            .trim()
            .to_string();
        if validate_identifier(&identifier).is_err() {
            continue;
        }
        if settings.is_known(&identifier) {
            prompt.say(&format!(
                "Course with identifier \"{identifier}\" already exists, do you want to overwrite it?"
            ))?;
            if !prompt.confirm()? {
                continue;
            }
        }
        return Ok(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gs(id: &str, name: &str, term: &str) -> GradingCourse {
        GradingCourse {
            id: id.to_string(),
            name: name.to_string(),
            term: term.to_string(),
        }
    }

    #[test]
    fn test_course_menu_pads_names() {
        let lines = course_menu(&[gs("1", "CS 101", "Fall"), gs("22", "Algorithms", "Spring")]);
        assert_eq!(lines[0], "CS 101    \tFall\t1");
        assert_eq!(lines[1], "Algorithms\tSpring\t22");
    }

    #[test]
    fn test_course_listing_has_header() {
        let lines = course_listing(&[gs("1234", "CS 101", "Fall 2024")]);
        assert_eq!(lines[0], "ID\tCourse Name\tTerm");
        assert_eq!(lines[1], "1234\tCS 101     \tFall 2024");
    }

    #[test]
    fn test_class_menu() {
        let classes = vec![DiscussionClass {
            id: "n1".to_string(),
            number: "CS 101".to_string(),
            term: "Fall 2024".to_string(),
            is_ta: true,
        }];
        assert_eq!(class_menu(&classes), vec!["CS 101\tFall 2024"]);
    }

    #[test]
    fn test_describe_default_update() {
        let reg = |default| Registration {
            replaced: false,
            default,
        };
        assert_eq!(
            describe_default_update("cs101", &reg(DefaultUpdate::Initial)).as_deref(),
            Some("No default course set, setting to cs101.")
        );
        assert_eq!(
            describe_default_update("cs101", &reg(DefaultUpdate::Newest)).as_deref(),
            Some("Setting cs101 to the default course.")
        );
        assert_eq!(describe_default_update("cs101", &reg(DefaultUpdate::Unchanged)), None);
    }
}
