//! Role prompt templates for Reelcrew.
//!
//! Prompts can be customized by placing a `roles.toml` file in the custom
//! prompts directory. Templates use `{{name}}` placeholders; the
//! `termination_token` variable is always available.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Style phrase every image prompt must carry.
pub const IMAGE_STYLE: &str = "Abstract Art Style / Ultra High Quality.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub roles: RolePrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// System prompts, one per role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePrompts {
    pub script_writer: String,
    pub voice_actor: String,
    pub graphic_designer: String,
    pub director: String,
}

impl Default for RolePrompts {
    fn default() -> Self {
        Self {
            script_writer: r#"You are a creative assistant tasked with writing a script for a short video.
The script should consist of captions designed to be displayed on-screen, with the following guidelines:
1. Each caption must be short and impactful (no more than 8 words) to avoid overwhelming the viewer.
2. The script should have exactly 5 captions, each representing a key moment in the story.
3. The flow of captions must feel natural, like a compelling voiceover guiding the viewer through the narrative.
4. Always start with a question or a statement that keeps the viewer wanting to know more.
5. You must also include the topic and takeaway in your response.
6. The caption values must ONLY include the captions, no additional meta data or information.

Respond with a JSON object with the fields "topic", "takeaway" and "captions"."#
                .to_string(),

            voice_actor: r#"You are a helpful agent tasked with generating and saving voiceovers.
Use the generate_voiceovers tool with the exact captions from the script.
Only respond with '{{termination_token}}' once files are successfully saved locally."#
                .to_string(),

            graphic_designer: r#"You are a helpful agent tasked with generating and saving images for a short video.
You are given a list of captions.
You will convert each caption into an optimized prompt for the image generation tool.
Your prompts must be concise and descriptive and maintain the same style and tone as the captions while ensuring continuity between the images.
Your prompts must mention that the output images MUST be in: "{{image_style}}" (Include with each prompt)
You will then use the prompts list to generate images for each provided caption.
Only respond with '{{termination_token}}' once the files are successfully saved locally."#
                .to_string(),

            director: r#"You are a helpful agent tasked with generating a short video.
You are given a list of captions which you will use to create the short video.
Remove any characters that are not alphanumeric or spaces from the captions.
You will then use the captions list to generate a video.
Only respond with '{{termination_token}}' once the video is successfully generated and saved locally."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let roles_path = custom_path.join("roles.toml");
            if roles_path.exists() {
                let content = std::fs::read_to_string(&roles_path)?;
                prompts.roles = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a template with custom config variables plus the built-ins.
    ///
    /// Built-ins (`termination_token`, `image_style`) take precedence over
    /// custom variables of the same name.
    pub fn render_with_builtins(&self, template: &str, termination_token: &str) -> String {
        let mut merged = self.variables.clone();
        merged.insert("termination_token".to_string(), termination_token.to_string());
        merged.insert("image_style".to_string(), IMAGE_STYLE.to_string());
        Self::render(template, &merged)
    }
}
