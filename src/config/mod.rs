//! Configuration module for Reelcrew.
//!
//! Handles loading and managing application settings and role prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, RolePrompts, IMAGE_STYLE};
pub use settings::{
    GeneralSettings, ModelSettings, PromptSettings, Settings, TeamSettings, ToolSettings,
};
