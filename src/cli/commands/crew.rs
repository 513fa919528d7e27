//! Wiring shared by the commands that run the crew.

use crate::cli::TranscriptPrinter;
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::model::{ChatModel, OpenAiChatModel};
use crate::team::{RoundRobinTeam, TaskResult};
use crate::tools::{MediaTools, RunWorkspace, Studio, ToolContext};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// A configured team plus the model and media backends it runs against.
pub(crate) struct CrewSession {
    team: RoundRobinTeam,
    model: Box<dyn ChatModel>,
    media: Arc<dyn MediaTools>,
    output_dir: PathBuf,
}

impl CrewSession {
    /// Build the standard crew from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let team = RoundRobinTeam::from_settings(&prompts, &settings.team)?;
        let model = OpenAiChatModel::from_settings(&settings.model)?;
        let media = Studio::from_settings(&settings.tools)?;

        Ok(Self::new(
            team,
            Box::new(model),
            Arc::new(media),
            settings.output_dir(),
        ))
    }

    pub fn new(
        team: RoundRobinTeam,
        model: Box<dyn ChatModel>,
        media: Arc<dyn MediaTools>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            team,
            model,
            media,
            output_dir,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Run the crew once, streaming the transcript to the console.
    ///
    /// Each run writes into its own directory under the output dir.
    pub async fn run(&mut self, task: &str) -> Result<TaskResult> {
        let workspace = RunWorkspace::create(&self.output_dir, &RunWorkspace::new_run_id())?;
        info!("Run {} writing to {}", workspace.run_id(), workspace.root().display());
        let tools = ToolContext::new(self.media.clone(), workspace);

        let mut printer = TranscriptPrinter::new();
        let result = self
            .team
            .run(self.model.as_ref(), &tools, task, &mut |event| printer.handle(event))
            .await?;

        TranscriptPrinter::summary(&result);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeamSettings;
    use crate::model::ModelReply;
    use crate::team::StopReason;
    use crate::testing::{RecordingTools, ScriptedModel};

    #[tokio::test]
    async fn test_each_run_gets_its_own_directory() {
        let dir = tempfile::tempdir().unwrap();
        let team = RoundRobinTeam::from_settings(&Prompts::default(), &TeamSettings::default())
            .unwrap();
        let script = r#"{"topic": "t", "takeaway": "k",
            "captions": ["one", "two", "three", "four", "five"]}"#;
        let model = ScriptedModel::new(vec![
            ModelReply::text(script),
            ModelReply::text("TERMINATE"),
            ModelReply::text(script),
            ModelReply::text("TERMINATE"),
        ]);
        let mut session = CrewSession::new(
            team,
            Box::new(model),
            Arc::new(RecordingTools::default()),
            dir.path().to_path_buf(),
        );

        let first = session.run("first").await.unwrap();
        let second = session.run("second").await.unwrap();

        assert_ne!(first.output_dir, second.output_dir);
        assert!(first.output_dir.join("voiceovers").is_dir());
        assert!(matches!(second.stop_reason, StopReason::TerminationToken { .. }));
    }
}
