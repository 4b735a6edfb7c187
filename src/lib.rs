//! Shared library for `gs-tools`
//! Roster building, course registry, and deadline extensions used by the `gstools` CLI

pub mod core;
pub mod logger;
pub mod platforms;

pub use crate::core::{config, get_version};
