//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
///
/// `path` is the `--config` file if one was given.
pub fn run_config(action: &ConfigAction, path: Option<PathBuf>, settings: Settings) -> Result<()> {
    let config_path = path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!(
                    "Config file already exists: {}",
                    config_path.display()
                ));
                Output::info("Use --force to overwrite it.");
                return Ok(());
            }

            settings.save_to(&config_path)?;
            Output::success(&format!("Wrote config file: {}", config_path.display()));
            Output::list_item("Edit [model] to point at your chat backend");
            Output::list_item("Edit [prompts] custom_dir to override role prompts");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_and_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.model.name = "mistral:7b".to_string();
        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), settings).unwrap();
        assert_eq!(
            Settings::load_from(Some(&path)).unwrap().model.name,
            "mistral:7b"
        );

        run_config(
            &ConfigAction::Init { force: false },
            Some(path.clone()),
            Settings::default(),
        )
        .unwrap();
        assert_eq!(
            Settings::load_from(Some(&path)).unwrap().model.name,
            "mistral:7b"
        );
    }
}
