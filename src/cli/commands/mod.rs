//! CLI command handlers for `gstools`.
//!
//! Each command is implemented in its own submodule and returns the process
//! exit code. Precondition failures (nothing configured yet, no names given)
//! print a message and exit 0; platform and file errors exit 1.

pub mod config;
pub mod extend;
pub mod roster;
pub mod settings;

use gs_tools::config::Config;
use gs_tools::platforms::credentials::GRADESCOPE_VARS;
use gs_tools::platforms::{Credentials, GradescopeClient, PlatformError};

/// Log in to Gradescope with the `GS_EMAIL`/`GS_PASSWORD` credentials
fn connect_gradescope(config: &Config) -> Result<GradescopeClient, PlatformError> {
    let credentials = Credentials::from_env(GRADESCOPE_VARS)?;
    println!("Connecting to gradescope...\n");
    GradescopeClient::login(&config.platforms.gradescope_url, &credentials)
}
