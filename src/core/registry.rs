//! Course registry: `settings.toml` plus one roster file per course.
//!
//! Layout under the data directory:
//!
//! ```text
//! settings.toml
//! courses/            (settings `course_path`)
//!   cs101.toml        gradescope-id + roster
//! ```
//!
//! Every write replaces the whole file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::roster::Roster;
use crate::core::settings::{Registration, Settings};

/// File name of the settings document inside the data directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Errors from reading or writing the registry
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `settings.toml` has not been created yet
    #[error("settings file {} not found; run `gstools config` first", .0.display())]
    SettingsMissing(PathBuf),
    /// Reading or writing a file failed
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// A stored document is not valid TOML for its schema
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
    /// A document could not be serialized
    #[error("failed to serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The identifier is not in the registered course list
    #[error("unknown course '{0}'")]
    UnknownCourse(String),
    /// The identifier is registered but its course file is gone
    #[error("course '{identifier}' is registered but {} is missing", .path.display())]
    CourseMissing {
        /// Course identifier
        identifier: String,
        /// Expected location of the course file
        path: PathBuf,
    },
    /// The identifier cannot be used as a course key
    #[error("invalid course identifier '{0}': use a non-empty name without spaces or path separators")]
    InvalidIdentifier(String),
}

/// Gradescope course id as stored: either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradingCourseId {
    /// Numeric id
    Number(i64),
    /// Textual id
    Text(String),
}

impl From<&str> for GradingCourseId {
    /// Numeric only when the text is exactly the canonical form of an integer;
    /// `"0123"` or `"+42"` stay text.
    fn from(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<i64>() {
            Ok(n) if n.to_string() == value => Self::Number(n),
            _ => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for GradingCourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One registered course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseConfig {
    /// Operator-chosen identifier; the file name, not stored inside the file
    #[serde(skip)]
    pub identifier: String,
    /// Gradescope course id
    #[serde(rename = "gradescope-id")]
    pub gradescope_id: GradingCourseId,
    /// Normalized name to email
    #[serde(default)]
    pub roster: Roster,
}

impl CourseConfig {
    /// Build a course configuration
    #[must_use]
    pub fn new(identifier: impl Into<String>, gradescope_id: GradingCourseId, roster: Roster) -> Self {
        Self {
            identifier: identifier.into(),
            gradescope_id,
            roster,
        }
    }
}

/// Check that `identifier` can name a course file
///
/// # Errors
/// Returns [`StoreError::InvalidIdentifier`] for empty names, whitespace or path separators.
pub fn validate_identifier(identifier: &str) -> Result<(), StoreError> {
    let invalid = identifier.is_empty()
        || identifier
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        || identifier == "."
        || identifier == "..";
    if invalid {
        return Err(StoreError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

/// The on-disk registry rooted at a data directory
#[derive(Debug, Clone)]
pub struct CourseStore {
    root: PathBuf,
}

impl CourseStore {
    /// Registry rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `settings.toml`
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Whether the settings document exists
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.settings_path().exists()
    }

    /// Write default settings unless a settings document already exists.
    ///
    /// Returns `true` when the defaults were written.
    ///
    /// # Errors
    /// Returns an error if the data directory or file cannot be written.
    pub fn initialize_settings(&self) -> Result<bool, StoreError> {
        if self.is_initialized() {
            return Ok(false);
        }
        crate::info!(
            "Settings file not found, initializing to defaults at {}",
            self.settings_path().display()
        );
        self.save_settings(&Settings::default())?;
        Ok(true)
    }

    /// Load the settings document
    ///
    /// # Errors
    /// Returns [`StoreError::SettingsMissing`] before [`initialize_settings`](Self::initialize_settings)
    /// has run, or an I/O/parse error.
    pub fn load_settings(&self) -> Result<Settings, StoreError> {
        let path = self.settings_path();
        if !path.exists() {
            return Err(StoreError::SettingsMissing(path));
        }
        let content = read(&path)?;
        Settings::from_toml(&content).map_err(|source| StoreError::Parse { path, source })
    }

    /// Save the settings document
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        write(&self.settings_path(), &toml::to_string_pretty(settings)?)
    }

    /// Directory holding the course files
    #[must_use]
    pub fn course_dir(&self, settings: &Settings) -> PathBuf {
        let course_path = Path::new(&settings.course_path);
        if course_path.is_absolute() {
            course_path.to_path_buf()
        } else {
            self.root.join(course_path)
        }
    }

    /// Path of the course file for `identifier`
    #[must_use]
    pub fn course_file(&self, settings: &Settings, identifier: &str) -> PathBuf {
        self.course_dir(settings).join(format!("{identifier}.toml"))
    }

    /// Register (or re-register) a course and persist the settings.
    ///
    /// Re-registering a known identifier warns and replaces its course file.
    /// The default course is updated as described in
    /// [`Settings::record_course`]. `settings` is only changed once both the
    /// course file and the settings document are written.
    ///
    /// # Errors
    /// Returns [`StoreError::SettingsMissing`] if the settings document was
    /// never initialized, or an error if a file cannot be written.
    pub fn register_course(
        &self,
        settings: &mut Settings,
        course: &CourseConfig,
    ) -> Result<Registration, StoreError> {
        validate_identifier(&course.identifier)?;
        if !self.is_initialized() {
            return Err(StoreError::SettingsMissing(self.settings_path()));
        }

        let mut updated = settings.clone();
        let registration = updated.record_course(&course.identifier);
        if registration.replaced {
            crate::warn!(
                "Course with identifier \"{}\" already exists, overwriting",
                course.identifier
            );
        }

        let path = self.course_file(&updated, &course.identifier);
        write(&path, &toml::to_string_pretty(course)?)?;
        self.save_settings(&updated)?;
        *settings = updated;

        crate::info!(
            "Registered course {} ({} students) at {}",
            course.identifier,
            course.roster.len(),
            path.display()
        );
        Ok(registration)
    }

    /// Load the course file of a registered course
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownCourse`] if the identifier is not
    /// registered, [`StoreError::CourseMissing`] if its file is gone, or a
    /// parse error.
    pub fn load_course(&self, settings: &Settings, identifier: &str) -> Result<CourseConfig, StoreError> {
        if !settings.is_known(identifier) {
            return Err(StoreError::UnknownCourse(identifier.to_string()));
        }
        let path = self.course_file(settings, identifier);
        if !path.exists() {
            return Err(StoreError::CourseMissing {
                identifier: identifier.to_string(),
                path,
            });
        }
        let content = read(&path)?;
        let mut course: CourseConfig =
            toml::from_str(&content).map_err(|source| StoreError::Parse { path, source })?;
        course.identifier = identifier.to_string();
        Ok(course)
    }
}

fn read(path: &Path) -> Result<String, StoreError> {
    fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_course_id_from_str() {
        assert_eq!(GradingCourseId::from("1234"), GradingCourseId::Number(1234));
        assert_eq!(
            GradingCourseId::from("abc-1"),
            GradingCourseId::Text("abc-1".to_string())
        );
        assert_eq!(GradingCourseId::from(" 42 ").to_string(), "42");
    }

    #[test]
    fn test_grading_course_id_keeps_non_canonical_numbers_verbatim() {
        assert_eq!(
            GradingCourseId::from("0123"),
            GradingCourseId::Text("0123".to_string())
        );
        assert_eq!(
            GradingCourseId::from("+42"),
            GradingCourseId::Text("+42".to_string())
        );
        assert_eq!(GradingCourseId::from("-7"), GradingCourseId::Number(-7));
        assert_eq!(GradingCourseId::from("0123").to_string(), "0123");
    }

    #[test]
    fn test_course_config_accepts_int_or_string_id() {
        let numeric: CourseConfig = toml::from_str("gradescope-id = 1234\n[roster]\n").unwrap();
        assert_eq!(numeric.gradescope_id, GradingCourseId::Number(1234));

        let text: CourseConfig =
            toml::from_str("gradescope-id = \"1234\"\n[roster]\n\"jane doe\" = \"jane@x.edu\"\n")
                .unwrap();
        assert_eq!(text.gradescope_id, GradingCourseId::Text("1234".to_string()));
        assert_eq!(text.roster.get("jane doe"), Some("jane@x.edu"));
    }

    #[test]
    fn test_course_config_serialized_keys() {
        let course = CourseConfig::new(
            "cs101",
            GradingCourseId::Number(1234),
            [("jane doe", "jane@x.edu")].into_iter().collect(),
        );
        let written = toml::to_string_pretty(&course).unwrap();
        assert!(written.contains("gradescope-id = 1234"));
        assert!(written.contains("[roster]"));
        assert!(written.contains("\"jane doe\" = \"jane@x.edu\""));
        assert!(!written.contains("cs101"));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("cs101").is_ok());
        assert!(validate_identifier("cs-101_fall").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("cs 101").is_err());
        assert!(validate_identifier("../cs101").is_err());
        assert!(validate_identifier("..").is_err());
    }

    #[test]
    fn test_course_dir_relative_and_absolute() {
        let store = CourseStore::new("/data");
        let mut settings = Settings::default();
        assert_eq!(store.course_dir(&settings), PathBuf::from("/data/courses"));
        settings.course_path = "/elsewhere".to_string();
        assert_eq!(store.course_dir(&settings), PathBuf::from("/elsewhere"));
        assert_eq!(
            store.course_file(&settings, "cs101"),
            PathBuf::from("/elsewhere/cs101.toml")
        );
    }
}
