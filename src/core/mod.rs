//! Core module: rosters, course registry, and the configuration and extension flows

pub mod config;
pub mod extension;
pub mod prompt;
pub mod reconcile;
pub mod registry;
pub mod roster;
pub mod settings;
pub mod setup;

/// Returns the current version of the `gs-tools` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
