//! Error types for Reelcrew.

use thiserror::Error;

/// Library-level error type for Reelcrew operations.
#[derive(Error, Debug)]
pub enum ReelcrewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model backend error: {0}")]
    Model(String),

    #[error("Script rejected: {0}")]
    Script(#[from] crate::script::ScriptError),

    #[error("Voiceover generation failed: {0}")]
    Voiceover(String),

    #[error("Image generation failed: {0}")]
    Image(String),

    #[error("Video assembly failed: {0}")]
    Video(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Reelcrew operations.
pub type Result<T> = std::result::Result<T, ReelcrewError>;
