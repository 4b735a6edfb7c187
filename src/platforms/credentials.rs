//! Login credentials read from the environment.

use super::PlatformError;

/// Environment variable names for Gradescope credentials.
pub const GRADESCOPE_VARS: (&str, &str) = ("GS_EMAIL", "GS_PASSWORD");

/// Environment variable names for Piazza credentials.
pub const PIAZZA_VARS: (&str, &str) = ("PZ_EMAIL", "PZ_PASSWORD");

/// Email and password for one platform
#[derive(Clone)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read credentials from a pair of environment variables
    ///
    /// # Errors
    /// Returns [`PlatformError::MissingCredential`] naming the first unset or empty variable.
    pub fn from_env((email_var, password_var): (&str, &str)) -> Result<Self, PlatformError> {
        Self::from_lookup((email_var, password_var), |var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup function.
    ///
    /// # Errors
    /// Returns [`PlatformError::MissingCredential`] naming the first missing variable.
    pub fn from_lookup<F>((email_var, password_var): (&str, &str), lookup: F) -> Result<Self, PlatformError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| {
            lookup(var)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| PlatformError::MissingCredential(var.to_string()))
        };
        Ok(Self {
            email: read(email_var)?,
            password: read(password_var)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_reads_both_vars() {
        let vars: HashMap<&str, &str> = [("GS_EMAIL", "prof@x.edu"), ("GS_PASSWORD", "hunter2")].into();
        let creds = Credentials::from_lookup(GRADESCOPE_VARS, |v| vars.get(v).map(ToString::to_string)).unwrap();
        assert_eq!(creds.email, "prof@x.edu");
        assert_eq!(creds.password, "hunter2");
    }

    #[test]
    fn test_missing_or_empty_var_is_named() {
        let vars: HashMap<&str, &str> = [("PZ_EMAIL", "ta@x.edu"), ("PZ_PASSWORD", "")].into();
        let err = Credentials::from_lookup(PIAZZA_VARS, |v| vars.get(v).map(ToString::to_string)).unwrap_err();
        assert!(matches!(err, PlatformError::MissingCredential(ref var) if var == "PZ_PASSWORD"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            email: "prof@x.edu".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
