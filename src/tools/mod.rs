//! Media generation tools the agents can call.
//!
//! Agents never touch the generators directly: the model asks for a tool by
//! name, [`parse_tool_call`] turns that into a [`ToolCall`], and
//! [`ToolContext::execute`] runs it against a [`MediaTools`] implementation
//! inside the current run's [`RunWorkspace`].

mod images;
mod speech;
mod studio;
mod video;
mod workspace;

pub use studio::Studio;
pub use workspace::RunWorkspace;

use crate::error::{ReelcrewError, Result};
use crate::model::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Generators behind the three agent tools.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Synthesize one voiceover per caption. Returns the saved files in caption order.
    async fn generate_voiceovers(
        &self,
        workspace: &RunWorkspace,
        captions: &[String],
    ) -> Result<Vec<PathBuf>>;

    /// Generate one image per prompt. Returns the saved files in prompt order.
    async fn generate_images(
        &self,
        workspace: &RunWorkspace,
        prompts: &[String],
    ) -> Result<Vec<PathBuf>>;

    /// Assemble the saved voiceovers and images into a captioned video.
    async fn generate_video(&self, workspace: &RunWorkspace, captions: &[String])
        -> Result<PathBuf>;
}

/// The tools an agent may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Voiceovers,
    Images,
    Video,
}

impl ToolKind {
    /// Function name exposed to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Voiceovers => "generate_voiceovers",
            ToolKind::Images => "generate_images",
            ToolKind::Video => "generate_video",
        }
    }

    /// Function definition exposed to the model.
    pub fn spec(&self) -> ToolSpec {
        let (description, field, field_description) = match self {
            ToolKind::Voiceovers => (
                "Generate a voiceover audio file for each caption and save them locally.",
                "captions",
                "The script captions, in order",
            ),
            ToolKind::Images => (
                "Generate an image for each prompt and save them locally.",
                "prompts",
                "One image prompt per caption, in caption order",
            ),
            ToolKind::Video => (
                "Assemble the saved voiceovers and images into a short captioned video.",
                "captions",
                "The script captions with only alphanumeric characters and spaces",
            ),
        };

        ToolSpec {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    field: {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": field_description
                    }
                },
                "required": [field]
            }),
        }
    }
}

/// A parsed tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    GenerateVoiceovers { captions: Vec<String> },
    GenerateImages { prompts: Vec<String> },
    GenerateVideo { captions: Vec<String> },
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::GenerateVoiceovers { .. } => ToolKind::Voiceovers,
            ToolCall::GenerateImages { .. } => ToolKind::Images,
            ToolCall::GenerateVideo { .. } => ToolKind::Video,
        }
    }
}

/// Parse a tool call from the model's function name and JSON arguments.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| ReelcrewError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match name {
        "generate_voiceovers" => Ok(ToolCall::GenerateVoiceovers {
            captions: string_list(&args, "captions")?,
        }),
        "generate_images" => Ok(ToolCall::GenerateImages {
            prompts: string_list(&args, "prompts")?,
        }),
        "generate_video" => Ok(ToolCall::GenerateVideo {
            captions: string_list(&args, "captions")?,
        }),
        _ => Err(ReelcrewError::Agent(format!("Unknown tool: {}", name))),
    }
}

/// Read a list of strings from the arguments.
///
/// Small models sometimes send the list JSON-encoded inside a string;
/// that form is accepted too.
fn string_list(args: &serde_json::Value, key: &str) -> Result<Vec<String>> {
    let value = &args[key];

    let items = match value {
        serde_json::Value::Array(items) => items.clone(),
        serde_json::Value::String(encoded) => serde_json::from_str::<Vec<serde_json::Value>>(encoded)
            .map_err(|_| ReelcrewError::Agent(format!("'{}' must be a list of strings", key)))?,
        _ => return Err(ReelcrewError::Agent(format!("Missing '{}' argument", key))),
    };

    let list = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ReelcrewError::Agent(format!("'{}' must be a list of strings", key)))
        })
        .collect::<Result<Vec<_>>>()?;

    if list.is_empty() {
        return Err(ReelcrewError::Agent(format!("'{}' must not be empty", key)));
    }
    Ok(list)
}

/// Tool execution context for one run.
#[derive(Clone)]
pub struct ToolContext {
    pub media: Arc<dyn MediaTools>,
    pub workspace: RunWorkspace,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(media: Arc<dyn MediaTools>, workspace: RunWorkspace) -> Self {
        Self { media, workspace }
    }

    /// Execute a tool call and return the result as a string for the model.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::GenerateVoiceovers { captions } => {
                let files = self
                    .media
                    .generate_voiceovers(&self.workspace, captions)
                    .await?;
                info!("Saved {} voiceover(s)", files.len());
                Ok(format!(
                    "Saved {} voiceover file(s) locally:\n{}",
                    files.len(),
                    format_paths(&files)
                ))
            }
            ToolCall::GenerateImages { prompts } => {
                let files = self.media.generate_images(&self.workspace, prompts).await?;
                info!("Saved {} image(s)", files.len());
                Ok(format!(
                    "Saved {} image file(s) locally:\n{}",
                    files.len(),
                    format_paths(&files)
                ))
            }
            ToolCall::GenerateVideo { captions } => {
                let file = self.media.generate_video(&self.workspace, captions).await?;
                info!("Saved video to {}", file.display());
                Ok(format!("Video saved locally: {}", file.display()))
            }
        }
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("- {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
