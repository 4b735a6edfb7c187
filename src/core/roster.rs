//! Course rosters: normalized student name to email.
//!
//! Rosters come from two places. A CSV roster export ([`parse_roster_csv`])
//! carries names as `"Last, First"` and is normalized to `"first last"`.
//! Discussion-platform users are matched to enrolled emails in
//! [`crate::core::reconcile`] and keep their display name, lower-cased only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Role column value selecting student rows in a roster export.
pub const STUDENT_ROLE: &str = "Student";

/// Minimum number of columns in a roster export row: name, email, role.
const MIN_COLUMNS: usize = 3;

/// Errors raised while reading a roster export
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The export could not be opened
    #[error("failed to open roster {path}: {source}")]
    Io {
        /// Path of the export
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The export is not valid CSV
    #[error("malformed roster CSV: {0}")]
    Csv(#[from] csv::Error),
    /// A row does not carry name, email and role columns
    #[error("roster row {line} has {columns} column(s), expected at least 3 (name, email, role)")]
    ShortRow {
        /// 1-based line number in the export
        line: u64,
        /// Number of columns found
        columns: usize,
    },
}

/// Mapping from normalized student name to email address.
///
/// Keys are unique; inserting an existing name replaces its email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entries: BTreeMap<String, String>,
}

impl Roster {
    /// Create an empty roster
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any email already stored under `name`
    pub fn insert(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.entries.insert(name.into(), email.into());
    }

    /// Look up the email for an already-normalized name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Look up a name as typed by the operator.
    ///
    /// The name is lower-cased and nothing else: `"Jane Doe"` finds
    /// `"jane doe"`, but `"Doe, Jane"` does not.
    #[must_use]
    pub fn lookup(&self, raw_name: &str) -> Option<&str> {
        self.get(&raw_name.to_lowercase())
    }

    /// Number of students in the roster
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster has no students
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, email)| (name.as_str(), email.as_str()))
    }
}

impl<N: Into<String>, E: Into<String>> FromIterator<(N, E)> for Roster {
    fn from_iter<I: IntoIterator<Item = (N, E)>>(iter: I) -> Self {
        let mut roster = Self::new();
        for (name, email) in iter {
            roster.insert(name, email);
        }
        roster
    }
}

/// Normalize a roster-export name to lower-case `"first last"`.
///
/// `"Smith, John"` becomes `"john smith"`. Parts after the second comma are
/// dropped, so `"Smith, John, Jr"` is also `"john smith"`. A name without a
/// comma is kept as written, lower-cased and trimmed.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    let parts: Vec<&str> = raw.split(',').collect();
    match parts.as_slice() {
        [last, first, ..] => format!("{} {}", first.trim(), last.trim()).to_lowercase(),
        _ => raw.trim().to_lowercase(),
    }
}

/// Read a roster export from disk.
///
/// # Errors
/// Returns an error if the file cannot be opened or any row is malformed.
pub fn read_roster_csv<P: AsRef<Path>>(path: P) -> Result<Roster, RosterError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_roster_csv(file)
}

/// Parse a roster export with columns `[name, email, role, ...]`.
///
/// The first row is a header and is skipped. Only rows whose role is exactly
/// [`STUDENT_ROLE`] are kept.
///
/// # Errors
/// Returns [`RosterError::ShortRow`] for a row with fewer than three columns,
/// or [`RosterError::Csv`] if the input is not valid CSV.
pub fn parse_roster_csv<R: Read>(reader: R) -> Result<Roster, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut roster = Roster::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.len() < MIN_COLUMNS {
            return Err(RosterError::ShortRow {
                line: record.position().map_or(0, csv::Position::line),
                columns: record.len(),
            });
        }
        if &record[2] != STUDENT_ROLE {
            continue;
        }
        roster.insert(normalize_name(&record[0]), &record[1]);
    }

    crate::debug!("Parsed roster export with {} student(s)", roster.len());
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_last_first() {
        assert_eq!(normalize_name("Smith, John"), "john smith");
        assert_eq!(normalize_name("  Smith ,   John  "), "john smith");
    }

    #[test]
    fn test_normalize_ignores_extra_parts() {
        assert_eq!(normalize_name("Smith, John, Jr"), "john smith");
    }

    #[test]
    fn test_normalize_single_part_passes_through() {
        assert_eq!(normalize_name("Cher"), "cher");
        assert_eq!(normalize_name("John Smith"), "john smith");
    }

    #[test]
    fn test_normalize_is_idempotent_on_normalized_names() {
        let once = normalize_name("john smith");
        assert_eq!(once, "john smith");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn test_parse_keeps_only_students() {
        let csv = "Name,Email,Role\n\
                   \"Smith, John\",john@x.edu,Student\n\
                   \"Lee, Ann\",ann@x.edu,TA\n\
                   \"Park, Min\",min@x.edu,Instructor\n\
                   Cher,cher@x.edu,Student\n";
        let roster = parse_roster_csv(csv.as_bytes()).unwrap();

        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get("john smith"), Some("john@x.edu"));
        assert_eq!(roster.get("cher"), Some("cher@x.edu"));
        assert_eq!(roster.get("ann lee"), None);
    }

    #[test]
    fn test_parse_role_match_is_exact() {
        let csv = "Name,Email,Role\n\"Smith, John\",john@x.edu,student\n";
        let roster = parse_roster_csv(csv.as_bytes()).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_parse_last_write_wins() {
        let csv = "Name,Email,Role\n\
                   \"Smith, John\",first@x.edu,Student\n\
                   \"Smith, John\",second@x.edu,Student\n";
        let roster = parse_roster_csv(csv.as_bytes()).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.get("john smith"), Some("second@x.edu"));
    }

    #[test]
    fn test_parse_extra_columns_are_ignored() {
        let csv = "Name,Email,Role,Section\n\"Doe, Jane\",jane@x.edu,Student,A1\n";
        let roster = parse_roster_csv(csv.as_bytes()).unwrap();
        assert_eq!(roster.get("jane doe"), Some("jane@x.edu"));
    }

    #[test]
    fn test_parse_short_row_is_an_error() {
        let csv = "Name,Email,Role\n\"Doe, Jane\",jane@x.edu\n";
        let err = parse_roster_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, RosterError::ShortRow { columns: 2, .. }));
    }

    #[test]
    fn test_header_only_yields_empty_roster() {
        let roster = parse_roster_csv("Name,Email,Role\n".as_bytes()).unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn test_lookup_lowercases_only() {
        let roster: Roster = [("jane doe", "jane@x.edu")].into_iter().collect();
        assert_eq!(roster.lookup("Jane Doe"), Some("jane@x.edu"));
        assert_eq!(roster.lookup("JANE DOE"), Some("jane@x.edu"));
        assert_eq!(roster.lookup("Doe, Jane"), None);
    }
}
