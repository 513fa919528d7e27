//! Reelcrew - a four-agent crew for short captioned videos
//!
//! A local-first CLI that turns a one-line topic into a short video. Four role
//! agents take turns in a fixed order against a shared chat model:
//!
//! - `script_writer` writes a five-caption script as structured JSON
//! - `voice_actor` voices each caption
//! - `graphic_designer` generates one image per caption
//! - `director` assembles the final captioned video
//!
//! # Architecture
//!
//! - `config` - Settings and role prompt templates
//! - `model` - Chat model abstraction and the OpenAI-compatible backend
//! - `script` - The script data model and its validation
//! - `agent` - Role agents and single-turn execution
//! - `team` - Round-robin turn scheduling and termination
//! - `tools` - Media generation tools (speech, images, ffmpeg video)
//!
//! # Example
//!
//! ```rust,no_run
//! use reelcrew::config::{Prompts, Settings};
//! use reelcrew::model::OpenAiChatModel;
//! use reelcrew::team::RoundRobinTeam;
//! use reelcrew::tools::{RunWorkspace, Studio, ToolContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let prompts = Prompts::load(None, None)?;
//!     let mut team = RoundRobinTeam::from_settings(&prompts, &settings.team)?;
//!     let model = OpenAiChatModel::from_settings(&settings.model)?;
//!
//!     let workspace = RunWorkspace::create(&settings.output_dir(), &RunWorkspace::new_run_id())?;
//!     let tools = ToolContext::new(Arc::new(Studio::from_settings(&settings.tools)?), workspace);
//!
//!     let result = team.run(&model, &tools, "a lost dog finds its way home", &mut |_| {}).await?;
//!     println!("{} turns, stopped by {}", result.turns.len(), result.stop_reason);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod openai;
pub mod script;
pub mod team;
pub mod tools;

#[cfg(test)]
mod testing;

pub use error::{ReelcrewError, Result};
