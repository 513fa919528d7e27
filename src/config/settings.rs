//! Configuration settings for Reelcrew.

use crate::error::{ReelcrewError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub team: TeamSettings,
    pub tools: ToolSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where each run writes its voiceovers, images and video.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "~/reelcrew/output".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of an OpenAI-compatible chat endpoint.
    pub base_url: String,
    /// Model name as understood by the backend.
    pub name: String,
    /// API key sent to the backend. Ollama accepts any value.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature (backend default if unset).
    pub temperature: Option<f32>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            name: "llama3.1:latest".to_string(),
            api_key: "ollama".to_string(),
            timeout_secs: crate::openai::DEFAULT_TIMEOUT_SECS,
            temperature: None,
        }
    }
}

/// Turn scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    /// Maximum turns per run. The default is one pass over the four roles.
    pub max_turns: usize,
    /// Sentinel whose presence in an agent message ends the run.
    pub termination_token: String,
    /// Maximum model calls an agent makes within one turn. With 1, a turn
    /// that calls tools ends with the tool results as its message; higher
    /// values let the model reply to the results. With the default of 1 a
    /// clean run ends on the turn budget rather than the termination token,
    /// so a `MaxTurns` stop is the normal outcome.
    pub max_tool_iterations: usize,
    /// How many times the script writer is asked for a valid script per run.
    pub script_attempts: usize,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            max_turns: 4,
            termination_token: "TERMINATE".to_string(),
            max_tool_iterations: 1,
            script_attempts: 2,
        }
    }
}

/// Media generation tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// API base for speech and image generation (OpenAI if unset).
    pub api_base: Option<String>,
    /// Text-to-speech model.
    pub speech_model: String,
    /// Voice used for every voiceover.
    pub voice: String,
    /// Image generation model.
    pub image_model: String,
    /// Image size, e.g. "1024x1024" or "1024x1792".
    pub image_size: String,
    /// Maximum concurrent generation requests within one tool call.
    pub max_concurrent: usize,
    /// Path or name of the ffmpeg binary.
    pub ffmpeg_path: String,
    /// Caption font size in the final video.
    pub font_size: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            api_base: None,
            speech_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            max_concurrent: 2,
            ffmpeg_path: "ffmpeg".to_string(),
            font_size: 48,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom role prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file and the result
    /// is validated.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Apply overrides from environment variables.
    ///
    /// The lookup is injected so tests don't have to mutate the process
    /// environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty("REELCREW_MODEL") {
            self.model.name = model;
        }
        if let Some(url) = non_empty("REELCREW_MODEL_URL") {
            self.model.base_url = url;
        }
        if let Some(key) = non_empty("OLLAMA_API_KEY") {
            self.model.api_key = key;
        }
        if let Some(dir) = non_empty("REELCREW_OUTPUT_DIR") {
            self.general.output_dir = dir;
        }
    }

    /// Check values that would otherwise fail midway through a run.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.model.base_url).map_err(|e| {
            ReelcrewError::Config(format!("Invalid model.base_url '{}': {}", self.model.base_url, e))
        })?;

        if let Some(base) = &self.tools.api_base {
            url::Url::parse(base).map_err(|e| {
                ReelcrewError::Config(format!("Invalid tools.api_base '{}': {}", base, e))
            })?;
        }

        if self.team.max_turns == 0 {
            return Err(ReelcrewError::Config("team.max_turns must be at least 1".to_string()));
        }
        if self.team.termination_token.trim().is_empty() {
            return Err(ReelcrewError::Config(
                "team.termination_token must not be empty".to_string(),
            ));
        }
        if self.team.script_attempts == 0 {
            return Err(ReelcrewError::Config(
                "team.script_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ReelcrewError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reelcrew")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}
