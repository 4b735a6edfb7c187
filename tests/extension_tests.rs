//! Integration tests for planning and applying deadline extensions

mod common;

use common::{initialized_store, write_roster_csv, ExtensionCall, FakeGrading};
use gs_tools::core::extension::{apply_extensions, plan_extensions, ExtendError};
use gs_tools::core::registry::{CourseStore, StoreError};
use gs_tools::core::settings::Settings;
use gs_tools::core::setup::configure_from_flags;
use gs_tools::logger::{set_level, Level};
use gs_tools::platforms::PlatformError;
use tempfile::TempDir;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| (*n).to_string()).collect()
}

/// Store with `cs101` (Gradescope 1234) holding Jane Doe and John Smith
fn store_with_course() -> (TempDir, CourseStore, Settings) {
    let (dir, store) = initialized_store();
    let csv = write_roster_csv(
        &dir,
        "\"Doe, Jane\",jane@x.edu,Student\n\"Smith, John\",john@x.edu,Student\n",
    );
    let mut settings = store.load_settings().unwrap();
    configure_from_flags(&store, &mut settings, Some("cs101"), Some("1234"), Some(&csv)).unwrap();
    (dir, store, settings)
}

fn homework() -> FakeGrading {
    FakeGrading::with_assignments(&[
        ("a1", "hw3 - Sorting"),
        ("a2", "hw4 - Graphs"),
        ("a3", "hw4 - Graphs (late)"),
        ("a4", "HW4 retake"),
    ])
}

#[test]
fn test_extend_single_student_single_assignment() {
    let (_dir, store, settings) = store_with_course();
    let grading = FakeGrading::with_assignments(&[("a1", "hw3"), ("a2", "hw4")]);

    let plan = plan_extensions(&store, &settings, None, &names(&["Jane Doe"]), Some(3)).unwrap();
    let mut out: Vec<u8> = Vec::new();
    let report = apply_extensions(&grading, &plan, "hw4", &mut out).unwrap();

    assert_eq!(
        grading.extensions(),
        vec![ExtensionCall {
            course_id: "1234".to_string(),
            assignment_id: "a2".to_string(),
            email: "jane@x.edu".to_string(),
            days: 3,
        }]
    );
    assert_eq!(report.extended, vec![("jane doe".to_string(), "jane@x.edu".to_string())]);
    assert!(report.skipped.is_empty());
    assert_eq!(grading.calls(), vec!["find_assignments 1234 hw4"]);

    let shown = String::from_utf8(out).unwrap();
    assert!(shown.contains("  hw4"));
    assert!(shown.contains("jane doe jane@x.edu"));
}

#[test]
fn test_extend_every_matching_assignment_for_every_student() {
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(
        &store,
        &settings,
        Some("cs101"),
        &names(&["Jane Doe", "JOHN SMITH"]),
        Some(2),
    )
    .unwrap();
    let report = apply_extensions(&grading, &plan, "hw4", &mut std::io::sink()).unwrap();

    // Title match is case-sensitive
    assert_eq!(report.assignments.len(), 2);
    let sent: Vec<(String, String)> = grading
        .extensions()
        .into_iter()
        .map(|call| (call.email, call.assignment_id))
        .collect();
    assert_eq!(
        sent,
        vec![
            ("jane@x.edu".to_string(), "a2".to_string()),
            ("jane@x.edu".to_string(), "a3".to_string()),
            ("john@x.edu".to_string(), "a2".to_string()),
            ("john@x.edu".to_string(), "a3".to_string()),
        ]
    );
}

#[test]
fn test_unknown_name_is_skipped() {
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(
        &store,
        &settings,
        None,
        &names(&["Nobody Here", "Jane Doe"]),
        Some(1),
    )
    .unwrap();
    let report = apply_extensions(&grading, &plan, "hw3", &mut std::io::sink()).unwrap();

    assert_eq!(report.skipped, vec!["nobody here"]);
    assert_eq!(grading.extensions().len(), 1);
    assert_eq!(grading.extensions()[0].email, "jane@x.edu");
}

#[test]
fn test_name_in_last_first_form_is_not_found() {
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(&store, &settings, None, &names(&["Doe, Jane"]), None).unwrap();
    let report = apply_extensions(&grading, &plan, "hw3", &mut std::io::sink()).unwrap();

    assert!(grading.extensions().is_empty());
    assert_eq!(report.skipped, vec!["doe, jane"]);
}

#[test]
fn test_days_default_to_settings() {
    let (_dir, store, mut settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(&store, &settings, None, &names(&["Jane Doe"]), None).unwrap();
    assert_eq!(plan.days, 5);

    settings.set("default-length", "9").unwrap();
    let plan = plan_extensions(&store, &settings, None, &names(&["Jane Doe"]), None).unwrap();
    apply_extensions(&grading, &plan, "hw3", &mut std::io::sink()).unwrap();
    assert_eq!(grading.extensions()[0].days, 9);
}

#[test]
fn test_no_matching_assignment_extends_nothing() {
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(&store, &settings, None, &names(&["Jane Doe"]), Some(3)).unwrap();
    let mut out: Vec<u8> = Vec::new();
    let report = apply_extensions(&grading, &plan, "project", &mut out).unwrap();

    assert!(report.assignments.is_empty());
    assert!(report.extended.is_empty());
    assert!(grading.extensions().is_empty());
    assert!(out.is_empty());
}

#[test]
fn test_platform_rejection_stops_the_run() {
    let (_dir, store, settings) = store_with_course();
    let mut grading = homework();
    grading.rejected.insert("jane@x.edu".to_string());

    let plan = plan_extensions(
        &store,
        &settings,
        None,
        &names(&["Jane Doe", "John Smith"]),
        Some(3),
    )
    .unwrap();
    let err = apply_extensions(&grading, &plan, "hw4", &mut std::io::sink()).unwrap_err();

    assert!(matches!(err, ExtendError::Platform(PlatformError::Rejected(_))));
    assert!(!err.is_precondition());
    assert!(grading.extensions().is_empty());
}

#[test]
fn test_preconditions() {
    let (_dir, store) = initialized_store();
    let empty = store.load_settings().unwrap();
    let err = plan_extensions(&store, &empty, None, &names(&["Jane Doe"]), None).unwrap_err();
    assert!(matches!(err, ExtendError::NoCourses));
    assert!(err.is_precondition());

    let (_dir, store, settings) = store_with_course();
    let err = plan_extensions(&store, &settings, None, &[], None).unwrap_err();
    assert!(matches!(err, ExtendError::NoNames));

    let err = plan_extensions(&store, &settings, Some("cs999"), &names(&["Jane Doe"]), None)
        .unwrap_err();
    assert!(matches!(err, ExtendError::Store(StoreError::UnknownCourse(_))));
    assert!(err.is_precondition());

    let mut no_default = settings;
    no_default.default_course = None;
    let err = plan_extensions(&store, &no_default, None, &names(&["Jane Doe"]), None).unwrap_err();
    assert!(matches!(err, ExtendError::NoCourseSelected));
}

#[test]
fn test_unknown_names_reach_output_at_error_level() {
    set_level(Level::Error);
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(
        &store,
        &settings,
        None,
        &names(&["Nobody Here", "Jane Doe"]),
        Some(1),
    )
    .unwrap();
    let mut out: Vec<u8> = Vec::new();
    let report = apply_extensions(&grading, &plan, "hw3", &mut out).unwrap();

    let shown = String::from_utf8(out).unwrap();
    assert!(shown.contains("could not find nobody here in the roster"));
    assert!(shown.contains("jane doe jane@x.edu"));
    assert_eq!(report.skipped, vec!["nobody here"]);
}

#[test]
fn test_unknown_names_reported_when_no_assignment_matches() {
    let (_dir, store, settings) = store_with_course();
    let grading = homework();

    let plan = plan_extensions(
        &store,
        &settings,
        None,
        &names(&["Nobody Here", "Jane Doe"]),
        Some(1),
    )
    .unwrap();
    let mut out: Vec<u8> = Vec::new();
    let report = apply_extensions(&grading, &plan, "project", &mut out).unwrap();

    assert!(report.assignments.is_empty());
    assert_eq!(report.skipped, vec!["nobody here"]);
    assert!(grading.extensions().is_empty());
    let shown = String::from_utf8(out).unwrap();
    assert_eq!(shown, "could not find nobody here in the roster\n");
}
