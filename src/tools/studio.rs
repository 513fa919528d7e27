//! The default [`MediaTools`] implementation.

use super::images::{parse_image_model, parse_image_size, render};
use super::speech::{parse_speech_model, parse_voice, synthesize};
use super::video::{assemble, Segment};
use super::{MediaTools, RunWorkspace};
use crate::config::ToolSettings;
use crate::error::{ReelcrewError, Result};
use crate::openai::{create_client, DEFAULT_TIMEOUT_SECS};
use crate::script::sanitize_caption;
use async_openai::types::{ImageModel, ImageSize, SpeechModel, Voice};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// Voiceovers and images via the OpenAI APIs, video via ffmpeg.
pub struct Studio {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    speech_model: SpeechModel,
    voice: Voice,
    image_model: ImageModel,
    image_size: ImageSize,
    max_concurrent: usize,
    ffmpeg_path: String,
    font_size: u32,
}

impl Studio {
    /// Create a studio from tool settings.
    ///
    /// Unknown voices or image sizes are rejected here rather than on the
    /// first tool call.
    pub fn from_settings(settings: &ToolSettings) -> Result<Self> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        let client = create_client(settings.api_base.as_deref(), None, timeout)?;

        Ok(Self {
            client,
            speech_model: parse_speech_model(&settings.speech_model),
            voice: parse_voice(&settings.voice)?,
            image_model: parse_image_model(&settings.image_model),
            image_size: parse_image_size(&settings.image_size)?,
            max_concurrent: settings.max_concurrent.max(1),
            ffmpeg_path: settings.ffmpeg_path.clone(),
            font_size: settings.font_size,
        })
    }
}

#[async_trait]
impl MediaTools for Studio {
    #[instrument(skip(self, workspace, captions), fields(count = captions.len()))]
    async fn generate_voiceovers(
        &self,
        workspace: &RunWorkspace,
        captions: &[String],
    ) -> Result<Vec<PathBuf>> {
        info!("Generating {} voiceover(s)", captions.len());

        let tasks = captions
            .iter()
            .enumerate()
            .map(|(idx, caption)| {
                let dest = workspace.voiceover_path(idx + 1);
                let model = self.speech_model.clone();
                let voice = self.voice.clone();
                async move {
                    synthesize(&self.client, model, voice, caption, &dest).await?;
                    Ok::<_, ReelcrewError>(dest)
                }
            })
            .collect::<Vec<_>>();

        stream::iter(tasks)
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }

    #[instrument(skip(self, workspace, prompts), fields(count = prompts.len()))]
    async fn generate_images(
        &self,
        workspace: &RunWorkspace,
        prompts: &[String],
    ) -> Result<Vec<PathBuf>> {
        info!("Generating {} image(s)", prompts.len());

        let tasks = prompts
            .iter()
            .enumerate()
            .map(|(idx, prompt)| {
                let dest = workspace.image_path(idx + 1);
                let model = self.image_model.clone();
                let size = self.image_size.clone();
                async move {
                    render(&self.client, model, size, prompt, &dest).await?;
                    Ok::<_, ReelcrewError>(dest)
                }
            })
            .collect::<Vec<_>>();

        stream::iter(tasks)
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }

    #[instrument(skip(self, workspace, captions), fields(count = captions.len()))]
    async fn generate_video(
        &self,
        workspace: &RunWorkspace,
        captions: &[String],
    ) -> Result<PathBuf> {
        let segments = captions
            .iter()
            .enumerate()
            .map(|(idx, caption)| Segment {
                image: workspace.image_path(idx + 1),
                voiceover: workspace.voiceover_path(idx + 1),
                caption: sanitize_caption(caption),
            })
            .collect::<Vec<_>>();

        assemble(
            &self.ffmpeg_path,
            &segments,
            self.font_size,
            &workspace.video_dir(),
            &workspace.video_path(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_rejects_unknown_voice() {
        let settings = ToolSettings {
            voice: "robot".to_string(),
            ..ToolSettings::default()
        };
        assert!(Studio::from_settings(&settings).is_err());
    }

    #[test]
    fn test_from_settings_clamps_concurrency() {
        let settings = ToolSettings {
            max_concurrent: 0,
            ..ToolSettings::default()
        };
        let studio = Studio::from_settings(&settings).unwrap();
        assert_eq!(studio.max_concurrent, 1);
    }

    #[tokio::test]
    async fn test_video_without_assets_fails() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::create(dir.path(), "run").unwrap();
        let studio = Studio::from_settings(&ToolSettings::default()).unwrap();

        let result = studio
            .generate_video(&workspace, &["Home at last!".to_string()])
            .await;
        assert!(matches!(result, Err(ReelcrewError::Video(_))));
    }
}
