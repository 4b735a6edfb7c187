//! Course settings stored in `settings.toml`
//!
//! The settings document lists the registered course identifiers, where their
//! roster files live, which course commands default to, and the default
//! extension length. Callers load a [`Settings`] value once, pass it to the
//! operations that need it, and save it back explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default directory (relative to the data directory) for course files
pub const DEFAULT_COURSE_PATH: &str = "courses";

/// Default extension length in days
pub const DEFAULT_EXTENSION_DAYS: u32 = 5;

const fn default_true() -> bool {
    true
}

const fn default_length() -> u32 {
    DEFAULT_EXTENSION_DAYS
}

fn default_course_path() -> String {
    DEFAULT_COURSE_PATH.to_string()
}

/// Course settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding one `<identifier>.toml` per course
    #[serde(default = "default_course_path")]
    pub course_path: String,
    /// Registered course identifiers, in registration order
    #[serde(default)]
    pub courses: Vec<String>,
    /// Course used when a command gets no `--id`
    #[serde(
        rename = "default-course",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_course: Option<String>,
    /// Whether each newly registered course becomes the default
    #[serde(rename = "default-to-newest", default = "default_true")]
    pub default_to_newest: bool,
    /// Extension length used when `--days` is omitted
    #[serde(rename = "default-length", default = "default_length")]
    pub default_length: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            course_path: default_course_path(),
            courses: Vec::new(),
            default_course: None,
            default_to_newest: true,
            default_length: DEFAULT_EXTENSION_DAYS,
        }
    }
}

/// How registering a course changed the default course
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultUpdate {
    /// No default existed; the new course became the default
    Initial,
    /// `default-to-newest` moved the default to the new course
    Newest,
    /// The default course was left alone
    Unchanged,
}

/// Effect of recording a course in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// The identifier was already registered and its course file is replaced
    pub replaced: bool,
    /// What happened to the default course
    pub default: DefaultUpdate,
}

impl Settings {
    /// Parse a settings document
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or a value has the wrong type.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Whether `identifier` is a registered course
    #[must_use]
    pub fn is_known(&self, identifier: &str) -> bool {
        self.courses.iter().any(|c| c == identifier)
    }

    /// Record a course registration and update the default course.
    ///
    /// A new identifier is appended to the course list. The default is set
    /// when none exists, or moved to `identifier` when `default-to-newest` is
    /// on, whatever the previous default was.
    pub fn record_course(&mut self, identifier: &str) -> Registration {
        let replaced = self.is_known(identifier);
        if !replaced {
            self.courses.push(identifier.to_string());
        }

        let default = if self.default_course.is_none() {
            DefaultUpdate::Initial
        } else if self.default_to_newest {
            DefaultUpdate::Newest
        } else {
            DefaultUpdate::Unchanged
        };
        if default != DefaultUpdate::Unchanged {
            self.default_course = Some(identifier.to_string());
        }

        Registration { replaced, default }
    }

    /// Get a setting by key
    ///
    /// Supported keys: `course_path`, `courses`, `default-course`,
    /// `default-to-newest`, `default-length`. Underscores and dashes are
    /// interchangeable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match canonical_key(key).as_str() {
            "course_path" => Some(self.course_path.clone()),
            "courses" => Some(self.courses.join(", ")),
            "default_course" => Some(self.default_course.clone().unwrap_or_default()),
            "default_to_newest" => Some(self.default_to_newest.to_string()),
            "default_length" => Some(self.default_length.to_string()),
            _ => None,
        }
    }

    /// Set a setting by key
    ///
    /// `courses` is read-only; it changes only through course registration.
    /// `default-course` must name a registered course.
    ///
    /// # Errors
    /// Returns an error for unknown or read-only keys and unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match canonical_key(key).as_str() {
            "course_path" => {
                if value.trim().is_empty() {
                    return Err("'course_path' cannot be empty".to_string());
                }
                self.course_path = value.to_string();
            }
            "courses" => {
                return Err(
                    "'courses' is read-only; register courses with `gstools config`".to_string(),
                )
            }
            "default_course" => {
                if !self.is_known(value) {
                    return Err(format!(
                        "Unknown course '{value}'. Registered courses: {}",
                        self.courses.join(", ")
                    ));
                }
                self.default_course = Some(value.to_string());
            }
            "default_to_newest" => {
                self.default_to_newest = value.parse::<bool>().map_err(|_| {
                    format!("Invalid boolean value for 'default-to-newest': '{value}'")
                })?;
            }
            "default_length" => {
                self.default_length = value.parse::<u32>().map_err(|_| {
                    format!("Invalid number of days for 'default-length': '{value}'")
                })?;
            }
            _ => return Err(format!("Unknown settings key: '{key}'")),
        }
        Ok(())
    }

    /// Reset a setting to its default
    ///
    /// # Errors
    /// Returns an error for unknown or read-only keys.
    pub fn unset(&mut self, key: &str) -> Result<(), String> {
        let defaults = Self::default();
        match canonical_key(key).as_str() {
            "course_path" => self.course_path = defaults.course_path,
            "default_course" => self.default_course = None,
            "default_to_newest" => self.default_to_newest = defaults.default_to_newest,
            "default_length" => self.default_length = defaults.default_length,
            "courses" => return Err("'courses' is read-only".to_string()),
            _ => return Err(format!("Unknown settings key: '{key}'")),
        }
        Ok(())
    }

    /// Restore every preference to its default, keeping the registered courses
    /// and the default course pointer.
    pub fn reset_preferences(&mut self) {
        let defaults = Self::default();
        self.course_path = defaults.course_path;
        self.default_to_newest = defaults.default_to_newest;
        self.default_length = defaults.default_length;
    }
}

fn canonical_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  course_path = \"{}\"", self.course_path)?;
        writeln!(f, "  courses = [{}]", self.courses.join(", "))?;
        writeln!(
            f,
            "  default-course = \"{}\"",
            self.default_course.as_deref().unwrap_or_default()
        )?;
        writeln!(f, "  default-to-newest = {}", self.default_to_newest)?;
        writeln!(f, "  default-length = {}", self.default_length)?;
        Ok(())
    }
}
