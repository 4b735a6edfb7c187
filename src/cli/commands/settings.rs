//! Settings command handler

use std::io::{self, Write};
use std::process::ExitCode;

use crate::args::SettingsSubcommand;
use gs_tools::config::Config;
use gs_tools::core::registry::{CourseStore, StoreError};
use gs_tools::core::settings::Settings;

/// Dispatch settings subcommands
pub fn run(store: &CourseStore, config: &Config, subcommand: Option<SettingsSubcommand>) -> ExitCode {
    let mut settings = match store.load_settings() {
        Ok(settings) => settings,
        Err(StoreError::SettingsMissing(_)) => {
            println!("No courses configured yet, run `gstools config` first.");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("✗ {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match subcommand {
        None => {
            handle_show(store, config, &settings);
            Ok(())
        }
        Some(SettingsSubcommand::Get { key }) => handle_get(&settings, &key),
        Some(SettingsSubcommand::Set { key, value }) => {
            handle_set(store, &mut settings, &key, &value)
        }
        Some(SettingsSubcommand::Unset { key }) => handle_unset(store, &mut settings, &key),
        Some(SettingsSubcommand::Reset) => handle_reset(store, &mut settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn handle_show(store: &CourseStore, config: &Config, settings: &Settings) {
    println!("\n=== Settings ({}) ===\n", store.settings_path().display());
    print!("{settings}");
    println!("\n=== Configuration ({}) ===\n", Config::get_config_file_path().display());
    print!("{config}");
}

fn handle_get(settings: &Settings, key: &str) -> Result<(), String> {
    let value = settings
        .get(key)
        .ok_or_else(|| format!("Unknown settings key: '{key}'"))?;
    println!("{value}");
    Ok(())
}

fn handle_set(
    store: &CourseStore,
    settings: &mut Settings,
    key: &str,
    value: &str,
) -> Result<(), String> {
    settings.set(key, value)?;
    save(store, settings)?;
    println!("✓ Set {key} = {value}");
    Ok(())
}

fn handle_unset(store: &CourseStore, settings: &mut Settings, key: &str) -> Result<(), String> {
    settings.unset(key)?;
    save(store, settings)?;
    println!("✓ Reset {key} to default");
    Ok(())
}

fn handle_reset(store: &CourseStore, settings: &mut Settings) -> Result<(), String> {
    print!("Reset all settings to defaults? Registered courses are kept. (y/N): ");
    io::stdout().flush().ok();

    let mut response = String::new();
    io::stdin().read_line(&mut response).ok();

    if gs_tools::core::prompt::parse_yes_no(&response) == Some(true) {
        settings.reset_preferences();
        save(store, settings)?;
        println!("✓ Settings reset to defaults");
    } else {
        println!("✗ Reset cancelled");
    }
    Ok(())
}

fn save(store: &CourseStore, settings: &Settings) -> Result<(), String> {
    store
        .save_settings(settings)
        .map_err(|e| format!("Failed to save settings: {e}"))
}
