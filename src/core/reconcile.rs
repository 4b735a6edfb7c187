//! Build a roster by matching discussion-platform students to grading-platform
//! enrollment through a shared email address.

use std::collections::HashSet;
use std::io::{self, Write};

use crate::core::roster::Roster;
use crate::platforms::DiscussionUser;

/// Role marking students on the discussion platform.
pub const DISCUSSION_STUDENT_ROLE: &str = "student";

/// Result of cross-referencing the two platforms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Students whose email matched the grading platform enrollment
    pub roster: Roster,
    /// Display names of students without any enrolled email, in listing order
    pub unmatched: Vec<String>,
}

impl Reconciliation {
    /// Operator message listing every student that could not be matched
    #[must_use]
    pub fn unmatched_message(&self) -> Option<String> {
        if self.unmatched.is_empty() {
            return None;
        }
        Some(format!(
            "could not find an email for the following students. Check to make sure they aren't enrolled on Gradescope\n  {}",
            self.unmatched.join("\n  ")
        ))
    }

    /// Write the unmatched students to `out` and log them.
    ///
    /// Returns `true` when there was anything to report.
    ///
    /// # Errors
    /// Returns an error if `out` cannot be written.
    pub fn report_unmatched<W: Write>(&self, out: &mut W) -> io::Result<bool> {
        let Some(message) = self.unmatched_message() else {
            return Ok(false);
        };
        writeln!(out, "{message}")?;
        crate::warn!("{message}");
        Ok(true)
    }
}

/// Candidate emails of a discussion user, in listed order
fn candidate_emails(user: &DiscussionUser) -> impl Iterator<Item = &str> {
    user.email
        .split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

/// Match each discussion-platform student to an enrolled email.
///
/// For every user with role [`DISCUSSION_STUDENT_ROLE`], the first candidate
/// email found in `enrolled` wins. Matched students are keyed by their display
/// name lower-cased; unlike roster exports, the name is not reordered.
/// Students with no enrolled email end up in
/// [`Reconciliation::unmatched`]. Other roles are ignored.
#[must_use]
pub fn reconcile(enrolled: &HashSet<String>, users: &[DiscussionUser]) -> Reconciliation {
    let mut result = Reconciliation::default();

    for user in users.iter().filter(|u| u.role == DISCUSSION_STUDENT_ROLE) {
        match candidate_emails(user).find(|email| enrolled.contains(*email)) {
            Some(email) => result.roster.insert(user.name.to_lowercase(), email),
            None => result.unmatched.push(user.name.clone()),
        }
    }

    crate::debug!(
        "Reconciled {} student(s), {} unmatched",
        result.roster.len(),
        result.unmatched.len()
    );
    result
}
