//! Per-run output directory layout.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Directory that holds everything one run produces.
///
/// ```text
/// <output_dir>/<run_id>/
///   voiceovers/voiceover_1.mp3 ...
///   images/image_1.png ...
///   video/final_video.mp4
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RunWorkspace {
    root: PathBuf,
}

impl RunWorkspace {
    /// Create the workspace directories for a run.
    ///
    /// The root is made absolute so paths handed to ffmpeg and shown to the
    /// user do not depend on the working directory.
    pub fn create(output_dir: &Path, run_id: &str) -> Result<Self> {
        let workspace = Self {
            root: std::path::absolute(output_dir.join(run_id))?,
        };
        std::fs::create_dir_all(workspace.voiceovers_dir())?;
        std::fs::create_dir_all(workspace.images_dir())?;
        std::fs::create_dir_all(workspace.video_dir())?;
        Ok(workspace)
    }

    /// A sortable, collision-free run identifier like `20261016-142501-3f9a1c2b`.
    pub fn new_run_id() -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}",
            chrono::Local::now().format("%Y%m%d-%H%M%S"),
            &suffix[..8]
        )
    }

    /// Run identifier (the directory name).
    pub fn run_id(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn voiceovers_dir(&self) -> PathBuf {
        self.root.join("voiceovers")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn video_dir(&self) -> PathBuf {
        self.root.join("video")
    }

    /// Voiceover file for a one-based caption index.
    pub fn voiceover_path(&self, index: usize) -> PathBuf {
        self.voiceovers_dir().join(format!("voiceover_{}.mp3", index))
    }

    /// Image file for a one-based caption index.
    pub fn image_path(&self, index: usize) -> PathBuf {
        self.images_dir().join(format!("image_{}.png", index))
    }

    pub fn video_path(&self) -> PathBuf {
        self.video_dir().join("final_video.mp4")
    }
}
