//! Pre-flight checks before a run.
//!
//! Validates that required tools and configuration are available
//! before starting runs that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{ReelcrewError, Result};
use std::process::Command;

/// Run pre-flight checks for a crew run.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    // A custom media endpoint may not need an OpenAI key.
    if settings.tools.api_base.is_none() {
        check_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref())?;
    }
    check_tool(&settings.tools.ffmpeg_path)?;
    Ok(())
}

/// Check that an OpenAI API key is configured.
fn check_api_key(key: Option<&str>) -> Result<()> {
    match key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(ReelcrewError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        None => Err(ReelcrewError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}

/// Check if ffmpeg (or a configured replacement) is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ReelcrewError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ReelcrewError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ReelcrewError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
