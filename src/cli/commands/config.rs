//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: &Settings, config_path: Option<&PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", render_settings(settings)?);
        }

        ConfigAction::Path => {
            let path = config_path.cloned().unwrap_or_else(Settings::default_config_path);
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Pretty TOML with the backend API key masked.
fn render_settings(settings: &Settings) -> Result<String> {
    let mut shown = settings.clone();
    if let Some(key) = shown.provider.backend_api_key.as_mut() {
        *key = "********".to_string();
    }
    toml::to_string_pretty(&shown).map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}
