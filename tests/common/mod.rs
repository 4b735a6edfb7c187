//! Shared fixtures for integration tests: in-memory platforms that record
//! every call, and a temporary data directory.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use gs_tools::core::registry::CourseStore;
use gs_tools::platforms::{
    filter_by_title, Assignment, DiscussionClass, DiscussionPlatform, DiscussionUser,
    GradingCourse, GradingPlatform, PlatformError,
};
use tempfile::TempDir;

/// An extension request as received by [`FakeGrading`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionCall {
    pub course_id: String,
    pub assignment_id: String,
    pub email: String,
    pub days: u32,
}

/// Grading platform backed by fixed data
#[derive(Default)]
pub struct FakeGrading {
    pub courses: Vec<GradingCourse>,
    pub enrolled: HashSet<String>,
    pub assignments: Vec<Assignment>,
    /// Emails the platform refuses to extend
    pub rejected: HashSet<String>,
    pub calls: RefCell<Vec<String>>,
    pub extensions: RefCell<Vec<ExtensionCall>>,
}

impl FakeGrading {
    pub fn with_assignments(titles: &[(&str, &str)]) -> Self {
        Self {
            assignments: titles
                .iter()
                .map(|(id, title)| Assignment {
                    id: (*id).to_string(),
                    title: (*title).to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn extensions(&self) -> Vec<ExtensionCall> {
        self.extensions.borrow().clone()
    }
}

impl GradingPlatform for FakeGrading {
    fn list_courses(&self) -> Result<Vec<GradingCourse>, PlatformError> {
        self.calls.borrow_mut().push("list_courses".to_string());
        Ok(self.courses.clone())
    }

    fn enrolled_emails(&self, course_id: &str) -> Result<HashSet<String>, PlatformError> {
        self.calls
            .borrow_mut()
            .push(format!("enrolled_emails {course_id}"));
        Ok(self.enrolled.clone())
    }

    fn find_assignments(
        &self,
        course_id: &str,
        title_substring: &str,
    ) -> Result<Vec<Assignment>, PlatformError> {
        self.calls
            .borrow_mut()
            .push(format!("find_assignments {course_id} {title_substring}"));
        Ok(filter_by_title(self.assignments.clone(), title_substring))
    }

    fn apply_extension(
        &self,
        course_id: &str,
        assignment: &Assignment,
        email: &str,
        days: u32,
    ) -> Result<(), PlatformError> {
        if self.rejected.contains(email) {
            return Err(PlatformError::Rejected(format!("{email} is not enrolled")));
        }
        self.extensions.borrow_mut().push(ExtensionCall {
            course_id: course_id.to_string(),
            assignment_id: assignment.id.clone(),
            email: email.to_string(),
            days,
        });
        Ok(())
    }
}

/// Discussion platform backed by fixed data
#[derive(Default, Clone)]
pub struct FakeDiscussion {
    pub classes: Vec<DiscussionClass>,
    pub users: Vec<DiscussionUser>,
    pub calls: std::rc::Rc<RefCell<Vec<String>>>,
}

impl DiscussionPlatform for FakeDiscussion {
    fn list_classes(&self) -> Result<Vec<DiscussionClass>, PlatformError> {
        self.calls.borrow_mut().push("list_classes".to_string());
        Ok(self.classes.clone())
    }

    fn list_users(&self, class_id: &str) -> Result<Vec<DiscussionUser>, PlatformError> {
        self.calls.borrow_mut().push(format!("list_users {class_id}"));
        Ok(self.users.clone())
    }
}

pub fn course(id: &str, name: &str, term: &str) -> GradingCourse {
    GradingCourse {
        id: id.to_string(),
        name: name.to_string(),
        term: term.to_string(),
    }
}

pub fn class(id: &str, number: &str, is_ta: bool) -> DiscussionClass {
    DiscussionClass {
        id: id.to_string(),
        number: number.to_string(),
        term: "Fall 2024".to_string(),
        is_ta,
    }
}

pub fn user(name: &str, email: &str, role: &str) -> DiscussionUser {
    DiscussionUser {
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
    }
}

/// A fresh data directory with initialized settings
pub fn initialized_store() -> (TempDir, CourseStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = CourseStore::new(temp_dir.path());
    store.initialize_settings().expect("Failed to initialize settings");
    (temp_dir, store)
}

/// Write a roster export into `dir` and return its path
pub fn write_roster_csv(dir: &TempDir, rows: &str) -> PathBuf {
    let path = dir.path().join("roster.csv");
    fs::write(&path, format!("Name,Email,Role\n{rows}")).expect("Failed to write roster");
    path
}
