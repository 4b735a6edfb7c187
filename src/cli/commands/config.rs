//! Config command handler: register a course or list Gradescope courses

use std::path::Path;
use std::process::ExitCode;

use gs_tools::config::Config;
use gs_tools::core::prompt::Prompt;
use gs_tools::core::registry::{CourseConfig, CourseStore};
use gs_tools::core::settings::Registration;
use gs_tools::core::setup::{
    configure_course, course_listing, describe_default_update, interactive_setup,
    prepare_settings, FlagSetup, SetupError,
};
use gs_tools::error;
use gs_tools::platforms::credentials::PIAZZA_VARS;
use gs_tools::platforms::{Credentials, DiscussionPlatform, GradingPlatform, PiazzaClient};

use super::connect_gradescope;

/// Dispatch the config command.
///
/// `--list` wins over everything else; any of `--id`, `--gradescope` or
/// `--roster` selects flag mode; no options at all runs the interactive setup.
pub fn run(
    store: &CourseStore,
    config: &Config,
    id: Option<&str>,
    gradescope: Option<&str>,
    roster: Option<&Path>,
    list: bool,
) -> ExitCode {
    let result = if list {
        handle_list(config)
    } else if id.is_none() && gradescope.is_none() && roster.is_none() {
        handle_interactive(store, config)
    } else {
        configure_course(store, id, gradescope, roster).map(
            |FlagSetup {
                 course,
                 registration,
                 initialized,
             }| {
                announce_initialized(initialized);
                report(&course, &registration);
            },
        )
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Course configuration failed: {e}");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}

fn announce_initialized(initialized: bool) {
    if initialized {
        println!("Settings file not found, initializing to defaults.");
    }
}

/// Print the Gradescope courses available to the logged-in account
fn handle_list(config: &Config) -> Result<(), SetupError> {
    let client = connect_gradescope(config)?;
    for line in course_listing(&client.list_courses()?) {
        println!("{line}");
    }
    Ok(())
}

fn handle_interactive(store: &CourseStore, config: &Config) -> Result<(), SetupError> {
    let (mut settings, initialized) = prepare_settings(store)?;
    announce_initialized(initialized);

    let client = connect_gradescope(config)?;
    let piazza_url = config.platforms.piazza_url.clone();
    let mut prompt = Prompt::stdio();
    let (course, registration) =
        interactive_setup(&mut prompt, store, &mut settings, &client, move || {
            let credentials = Credentials::from_env(PIAZZA_VARS)?;
            let piazza = PiazzaClient::login(&piazza_url, &credentials)?;
            Ok(Box::new(piazza) as Box<dyn DiscussionPlatform>)
        })?;
    report(&course, &registration);
    Ok(())
}

fn report(course: &CourseConfig, registration: &Registration) {
    if let Some(message) = describe_default_update(&course.identifier, registration) {
        println!("{message}");
    }
    println!(
        "✓ Configured {} (Gradescope course {}, {} students)",
        course.identifier,
        course.gradescope_id,
        course.roster.len()
    );
}
