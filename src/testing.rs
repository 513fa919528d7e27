//! Test doubles for the model and media tools.

use crate::error::{ReelcrewError, Result};
use crate::model::{ChatModel, ModelReply, ModelRequest};
use crate::tools::{MediaTools, RunWorkspace, ToolContext};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// A model that replays canned replies and records every request.
///
/// Running out of replies is reported as a backend error.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<ModelReply>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ReelcrewError::Model("no scripted reply left".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Media tools that write placeholder files and remember their arguments.
#[derive(Default)]
pub struct RecordingTools {
    voiceovers: Mutex<Vec<Vec<String>>>,
    images: Mutex<Vec<Vec<String>>>,
    videos: Mutex<Vec<Vec<String>>>,
    fail_images: bool,
}

impl RecordingTools {
    /// Image generation always fails.
    pub fn failing_images() -> Self {
        Self {
            fail_images: true,
            ..Self::default()
        }
    }

    /// A tool context backed by fresh recording tools in a temp directory.
    pub fn context() -> (ToolContext, Arc<RecordingTools>, tempfile::TempDir) {
        Self::context_with(RecordingTools::default())
    }

    pub fn context_with(tools: RecordingTools) -> (ToolContext, Arc<RecordingTools>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::create(dir.path(), "test-run").unwrap();
        let tools = Arc::new(tools);
        (ToolContext::new(tools.clone(), workspace), tools, dir)
    }

    pub fn voiceover_calls(&self) -> Vec<Vec<String>> {
        self.voiceovers.lock().unwrap().clone()
    }

    pub fn image_calls(&self) -> Vec<Vec<String>> {
        self.images.lock().unwrap().clone()
    }

    pub fn video_calls(&self) -> Vec<Vec<String>> {
        self.videos.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaTools for RecordingTools {
    async fn generate_voiceovers(
        &self,
        workspace: &RunWorkspace,
        captions: &[String],
    ) -> Result<Vec<PathBuf>> {
        self.voiceovers.lock().unwrap().push(captions.to_vec());
        (1..=captions.len())
            .map(|i| -> Result<PathBuf> {
                let path = workspace.voiceover_path(i);
                std::fs::write(&path, b"mp3")?;
                Ok(path)
            })
            .collect()
    }

    async fn generate_images(
        &self,
        workspace: &RunWorkspace,
        prompts: &[String],
    ) -> Result<Vec<PathBuf>> {
        self.images.lock().unwrap().push(prompts.to_vec());
        if self.fail_images {
            return Err(ReelcrewError::Image("quota exceeded".to_string()));
        }
        (1..=prompts.len())
            .map(|i| -> Result<PathBuf> {
                let path = workspace.image_path(i);
                std::fs::write(&path, b"png")?;
                Ok(path)
            })
            .collect()
    }

    async fn generate_video(
        &self,
        workspace: &RunWorkspace,
        captions: &[String],
    ) -> Result<PathBuf> {
        self.videos.lock().unwrap().push(captions.to_vec());
        let path = workspace.video_path();
        std::fs::write(&path, b"mp4")?;
        Ok(path)
    }
}
