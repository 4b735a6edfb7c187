//! External platforms: the grading service and the class discussion forum.
//!
//! The core only talks to these through [`GradingPlatform`] and
//! [`DiscussionPlatform`]. Every call blocks until the platform answers and
//! calls are never issued concurrently.

pub mod credentials;
pub mod error;
pub mod gradescope;
pub mod piazza;

use std::collections::HashSet;

pub use credentials::Credentials;
pub use error::PlatformError;
pub use gradescope::GradescopeClient;
pub use piazza::PiazzaClient;

/// A course as listed by the grading platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingCourse {
    /// Platform course id
    pub id: String,
    /// Course name
    pub name: String,
    /// Term label, e.g. `Fall 2024`
    pub term: String,
}

/// An assignment on the grading platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Platform assignment id
    pub id: String,
    /// Assignment title
    pub title: String,
}

/// A class on the discussion platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionClass {
    /// Network id used to open the class
    pub id: String,
    /// Course number, e.g. `CS 101`
    pub number: String,
    /// Term label
    pub term: String,
    /// Whether the logged-in user is a TA (or instructor) of the class
    pub is_ta: bool,
}

/// A user enrolled in a discussion-platform class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionUser {
    /// Display name
    pub name: String,
    /// Candidate emails, comma-separated in the platform's listing order
    pub email: String,
    /// Role, e.g. `student`, `ta`, `professor`
    pub role: String,
}

/// Operations consumed from the grading platform.
///
/// Implementations are already authenticated.
pub trait GradingPlatform {
    /// List the courses visible to the logged-in instructor
    ///
    /// # Errors
    /// Returns an error if the platform cannot be reached or its answer parsed.
    fn list_courses(&self) -> Result<Vec<GradingCourse>, PlatformError>;

    /// Emails of every user enrolled in `course_id`
    ///
    /// # Errors
    /// Returns an error if the platform cannot be reached or its answer parsed.
    fn enrolled_emails(&self, course_id: &str) -> Result<HashSet<String>, PlatformError>;

    /// Assignments of `course_id` whose title contains `title_substring`
    ///
    /// # Errors
    /// Returns an error if the platform cannot be reached or its answer parsed.
    fn find_assignments(
        &self,
        course_id: &str,
        title_substring: &str,
    ) -> Result<Vec<Assignment>, PlatformError>;

    /// Give `email` a deadline `days` days past the assignment's original one.
    ///
    /// This replaces any earlier extension for the same student and assignment.
    ///
    /// # Errors
    /// Returns an error if the student is unknown to the platform or the
    /// request is rejected.
    fn apply_extension(
        &self,
        course_id: &str,
        assignment: &Assignment,
        email: &str,
        days: u32,
    ) -> Result<(), PlatformError>;
}

/// Operations consumed from the discussion platform.
///
/// Implementations are already authenticated.
pub trait DiscussionPlatform {
    /// All classes of the logged-in user
    ///
    /// # Errors
    /// Returns an error if the platform cannot be reached or its answer parsed.
    fn list_classes(&self) -> Result<Vec<DiscussionClass>, PlatformError>;

    /// Every user of class `class_id`, whatever their role
    ///
    /// # Errors
    /// Returns an error if the platform cannot be reached or its answer parsed.
    fn list_users(&self, class_id: &str) -> Result<Vec<DiscussionUser>, PlatformError>;
}

/// Keep only the assignments whose title contains `needle` (case-sensitive).
#[must_use]
pub fn filter_by_title(assignments: Vec<Assignment>, needle: &str) -> Vec<Assignment> {
    assignments
        .into_iter()
        .filter(|assignment| assignment.title.contains(needle))
        .collect()
}
