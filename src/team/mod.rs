//! Round-robin turn scheduling.
//!
//! A run walks the crew in fixed order, one turn per agent, and stops when
//! an agent message mentions the termination token or the turn budget is
//! spent. Every step is reported to an observer as a [`TeamEvent`].

mod termination;

pub use termination::TextMentionTermination;

use crate::agent::{AgentRunner, RoleAgent, ToolCallRecord, TurnRecord};
use crate::config::{Prompts, TeamSettings};
use crate::error::{ReelcrewError, Result};
use crate::model::ChatModel;
use crate::script::{Script, ScriptError};
use crate::tools::ToolContext;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Terminated,
}

/// Why a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// An agent mentioned the termination token.
    TerminationToken { speaker: String },
    /// The turn budget was spent.
    MaxTurns { turns: usize },
    /// The script writer never produced a valid script.
    ScriptRejected { reason: ScriptError },
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TerminationToken { speaker } => {
                write!(f, "termination token from {}", speaker)
            }
            StopReason::MaxTurns { turns } => write!(f, "turn limit reached ({} turns)", turns),
            StopReason::ScriptRejected { reason } => write!(f, "script rejected: {}", reason),
        }
    }
}

/// Progress notifications for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamEvent {
    RunStarted { task: String },
    TurnStarted { turn: usize, speaker: &'static str },
    ScriptRejected { attempt: usize, reason: ScriptError },
    ScriptAccepted(Script),
    ToolCalled { speaker: String, record: ToolCallRecord },
    TurnFinished(TurnRecord),
    RunFinished(StopReason),
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct TaskResult {
    pub run_id: String,
    pub task: String,
    pub turns: Vec<TurnRecord>,
    pub script: Option<Script>,
    pub stop_reason: StopReason,
    /// Where the run's media was written.
    pub output_dir: PathBuf,
}

/// Crew that takes turns in fixed order.
pub struct RoundRobinTeam {
    agents: Vec<RoleAgent>,
    termination: TextMentionTermination,
    max_turns: usize,
    max_tool_iterations: usize,
    script_attempts: usize,
    state: SchedulerState,
}

impl RoundRobinTeam {
    /// Create a team. `agents` must not be empty.
    pub fn new(
        agents: Vec<RoleAgent>,
        termination: TextMentionTermination,
        max_turns: usize,
    ) -> Result<Self> {
        if agents.is_empty() {
            return Err(ReelcrewError::Config("A team needs at least one agent".to_string()));
        }

        Ok(Self {
            agents,
            termination,
            max_turns: max_turns.max(1),
            max_tool_iterations: 1,
            script_attempts: 2,
            state: SchedulerState::Idle,
        })
    }

    /// The standard four-role crew configured from settings.
    pub fn from_settings(prompts: &Prompts, settings: &TeamSettings) -> Result<Self> {
        let agents = RoleAgent::crew(prompts, &settings.termination_token);
        Ok(Self::new(
            agents,
            TextMentionTermination::new(settings.termination_token.clone()),
            settings.max_turns,
        )?
        .with_max_tool_iterations(settings.max_tool_iterations)
        .with_script_attempts(settings.script_attempts))
    }

    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    pub fn with_script_attempts(mut self, attempts: usize) -> Self {
        self.script_attempts = attempts.max(1);
        self
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn agents(&self) -> &[RoleAgent] {
        &self.agents
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Run the crew on a task, reporting progress to `on_event`.
    ///
    /// Model failures end the run with an error; tool failures do not.
    #[instrument(skip(self, model, tools, on_event), fields(run_id = %tools.workspace.run_id()))]
    pub async fn run(
        &mut self,
        model: &dyn ChatModel,
        tools: &ToolContext,
        task: &str,
        on_event: &mut dyn FnMut(TeamEvent),
    ) -> Result<TaskResult> {
        self.state = SchedulerState::Running;
        let result = self.run_turns(model, tools, task, on_event).await;
        self.state = SchedulerState::Terminated;
        result
    }

    async fn run_turns(
        &self,
        model: &dyn ChatModel,
        tools: &ToolContext,
        task: &str,
        on_event: &mut dyn FnMut(TeamEvent),
    ) -> Result<TaskResult> {
        info!("Starting run with {} agent(s), max {} turn(s)", self.agents.len(), self.max_turns);
        on_event(TeamEvent::RunStarted {
            task: task.to_string(),
        });

        let runner =
            AgentRunner::new(model, tools).with_max_tool_iterations(self.max_tool_iterations);
        let mut turns: Vec<TurnRecord> = Vec::new();
        let mut script = None;
        let mut stop_reason = StopReason::MaxTurns {
            turns: self.max_turns,
        };

        for turn in 0..self.max_turns {
            let agent = &self.agents[turn % self.agents.len()];
            on_event(TeamEvent::TurnStarted {
                turn: turn + 1,
                speaker: agent.name(),
            });

            let record = if agent.role.wants_structured_output() {
                match self.script_turn(&runner, agent, task, &turns, on_event).await? {
                    Ok((record, accepted)) => {
                        script = Some(accepted);
                        record
                    }
                    Err((record, reason)) => {
                        on_event(TeamEvent::TurnFinished(record.clone()));
                        turns.push(record);
                        stop_reason = StopReason::ScriptRejected { reason };
                        break;
                    }
                }
            } else {
                runner.take_turn(agent, task, &turns, None).await?
            };

            for call in &record.tool_calls {
                on_event(TeamEvent::ToolCalled {
                    speaker: record.speaker.clone(),
                    record: call.clone(),
                });
            }
            on_event(TeamEvent::TurnFinished(record.clone()));

            let terminated = self.termination.is_met(&record.content);
            let speaker = record.speaker.clone();
            turns.push(record);

            if terminated {
                info!("{} mentioned {}", speaker, self.termination.token());
                stop_reason = StopReason::TerminationToken { speaker };
                break;
            }
        }

        info!("Run finished after {} turn(s): {}", turns.len(), stop_reason);
        on_event(TeamEvent::RunFinished(stop_reason.clone()));

        Ok(TaskResult {
            run_id: tools.workspace.run_id(),
            task: task.to_string(),
            turns,
            script,
            stop_reason,
            output_dir: tools.workspace.root().to_path_buf(),
        })
    }

    /// Ask the script writer for a script, re-asking on invalid replies.
    ///
    /// The outer `Result` carries model failures; the inner one says whether
    /// a script was accepted. An accepted turn's content is the normalized
    /// script JSON.
    async fn script_turn(
        &self,
        runner: &AgentRunner<'_>,
        agent: &RoleAgent,
        task: &str,
        history: &[TurnRecord],
        on_event: &mut dyn FnMut(TeamEvent),
    ) -> Result<std::result::Result<(TurnRecord, Script), (TurnRecord, ScriptError)>> {
        let mut note: Option<String> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let mut record = runner
                .take_turn(agent, task, history, note.as_deref())
                .await?;

            match Script::parse(&record.content) {
                Ok(script) => {
                    let long = script.long_captions();
                    if !long.is_empty() {
                        warn!("Captions longer than the word limit: {:?}", long);
                    }
                    record.content = serde_json::to_string_pretty(&script)?;
                    on_event(TeamEvent::ScriptAccepted(script.clone()));
                    return Ok(Ok((record, script)));
                }
                Err(reason) => {
                    warn!("Script attempt {} rejected: {}", attempt, reason);
                    on_event(TeamEvent::ScriptRejected {
                        attempt,
                        reason: reason.clone(),
                    });
                    if attempt >= self.script_attempts {
                        return Ok(Err((record, reason)));
                    }
                    note = Some(format!(
                        "Your previous reply was rejected ({}). Reply again with only a JSON \
                         object containing \"topic\", \"takeaway\" and exactly 5 \"captions\".",
                        reason
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IMAGE_STYLE;
    use crate::model::{ModelReply, ToolInvocation};
    use crate::script::sanitize_caption;
    use crate::testing::{RecordingTools, ScriptedModel};
    use tokio_test::{assert_err, assert_ok};

    const SCRIPT: &str = r#"{
        "topic": "A lost dog finds its way home",
        "takeaway": "Loyalty always finds a path",
        "captions": [
            "Ever wondered how far loyalty goes?",
            "Max wandered off on a stormy night",
            "He followed scents through the city",
            "Strangers helped him along the way",
            "Home is where his heart led!"
        ]
    }"#;

    fn captions() -> Vec<String> {
        Script::parse(SCRIPT).unwrap().captions
    }

    fn tool_reply(name: &str, field: &str, items: &[String]) -> ModelReply {
        ModelReply {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: format!("call_{}", name),
                name: name.to_string(),
                arguments: serde_json::json!({ field: items }).to_string(),
            }],
        }
    }

    fn image_prompts() -> Vec<String> {
        captions()
            .iter()
            .map(|c| format!("{} {}", c, IMAGE_STYLE))
            .collect()
    }

    fn sanitized() -> Vec<String> {
        captions().iter().map(|c| sanitize_caption(c)).collect()
    }

    fn team() -> RoundRobinTeam {
        RoundRobinTeam::from_settings(&Prompts::default(), &TeamSettings::default()).unwrap()
    }

    fn speakers(result: &TaskResult) -> Vec<&str> {
        result.turns.iter().map(|t| t.speaker.as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_pass_invokes_every_tool_in_order() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            tool_reply("generate_voiceovers", "captions", &captions()),
            tool_reply("generate_images", "prompts", &image_prompts()),
            tool_reply("generate_video", "captions", &sanitized()),
        ]);
        let (tools, recorder, _dir) = RecordingTools::context();
        let mut team = team();
        let mut events = Vec::new();

        assert_eq!(team.state(), SchedulerState::Idle);
        let result = team
            .run(&model, &tools, "a lost dog finds its way home", &mut |e| events.push(e))
            .await
            .unwrap();

        assert_eq!(team.state(), SchedulerState::Terminated);
        assert_eq!(
            speakers(&result),
            vec!["script_writer", "voice_actor", "graphic_designer", "director"]
        );
        assert_eq!(result.stop_reason, StopReason::MaxTurns { turns: 4 });

        let script = result.script.unwrap();
        assert_eq!(script.captions.len(), 5);
        assert!(!script.takeaway.is_empty());

        assert_eq!(recorder.voiceover_calls(), vec![captions()]);
        let prompts = &recorder.image_calls()[0];
        assert_eq!(prompts.len(), 5);
        assert!(prompts.iter().all(|p| p.contains(IMAGE_STYLE)));
        let video = &recorder.video_calls()[0];
        assert!(video
            .iter()
            .all(|c| c.chars().all(|ch| ch.is_alphanumeric() || ch == ' ')));

        assert!(matches!(events.first(), Some(TeamEvent::RunStarted { .. })));
        assert!(matches!(
            events.last(),
            Some(TeamEvent::RunFinished(StopReason::MaxTurns { .. }))
        ));
        let tool_events = events
            .iter()
            .filter(|e| matches!(e, TeamEvent::ToolCalled { .. }))
            .count();
        assert_eq!(tool_events, 3);
    }

    #[tokio::test]
    async fn test_director_token_ends_run_with_reflection() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            tool_reply("generate_voiceovers", "captions", &captions()),
            ModelReply::text("Voiceovers saved."),
            tool_reply("generate_images", "prompts", &image_prompts()),
            ModelReply::text("Images saved."),
            tool_reply("generate_video", "captions", &sanitized()),
            ModelReply::text("Video saved. TERMINATE"),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team().with_max_tool_iterations(2);

        let result = team
            .run(&model, &tools, "a lost dog finds its way home", &mut |_| {})
            .await
            .unwrap();

        assert_eq!(result.turns.len(), 4);
        assert_eq!(
            result.stop_reason,
            StopReason::TerminationToken {
                speaker: "director".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_early_token_stops_remaining_turns() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            ModelReply::text("TERMINATE"),
        ]);
        let (tools, recorder, _dir) = RecordingTools::context();
        let mut team = team();

        let result = team.run(&model, &tools, "task", &mut |_| {}).await.unwrap();

        assert_eq!(speakers(&result), vec!["script_writer", "voice_actor"]);
        assert!(matches!(result.stop_reason, StopReason::TerminationToken { .. }));
        assert!(recorder.image_calls().is_empty());
        // No request beyond the voice actor's turn.
        assert_eq!(model.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_tool_failure_does_not_abort_run() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            tool_reply("generate_voiceovers", "captions", &captions()),
            tool_reply("generate_images", "prompts", &image_prompts()),
            tool_reply("generate_video", "captions", &sanitized()),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context_with(RecordingTools::failing_images());
        let mut team = team();

        let result = team.run(&model, &tools, "task", &mut |_| {}).await.unwrap();

        assert_eq!(result.turns.len(), 4);
        let designer = &result.turns[2];
        assert!(!designer.tool_calls[0].succeeded);
        assert!(designer.content.contains("quota exceeded"));
        assert_eq!(result.stop_reason, StopReason::MaxTurns { turns: 4 });
    }

    #[tokio::test]
    async fn test_invalid_script_is_retried_then_accepted() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(r#"{"topic": "t", "takeaway": "k", "captions": ["only one"]}"#),
            ModelReply::text(SCRIPT),
            ModelReply::text("TERMINATE"),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team();
        let mut rejected = 0;

        let result = team
            .run(&model, &tools, "task", &mut |e| {
                if matches!(e, TeamEvent::ScriptRejected { .. }) {
                    rejected += 1;
                }
            })
            .await
            .unwrap();

        assert_eq!(rejected, 1);
        assert!(result.script.is_some());
        // The retry and the accepted reply share one turn.
        assert_eq!(speakers(&result), vec!["script_writer", "voice_actor"]);
        let retry = &model.requests()[1];
        assert!(matches!(
            retry.messages.last(),
            Some(crate::model::ChatMessage::User { content, .. }) if content.contains("rejected")
        ));
    }

    #[tokio::test]
    async fn test_script_rejected_after_all_attempts() {
        let model = ScriptedModel::new(vec![
            ModelReply::text("no json here"),
            ModelReply::text("still no json"),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team();

        let result = team.run(&model, &tools, "task", &mut |_| {}).await.unwrap();

        assert_eq!(result.turns.len(), 1);
        assert!(result.script.is_none());
        assert!(matches!(
            result.stop_reason,
            StopReason::ScriptRejected {
                reason: ScriptError::Malformed(_)
            }
        ));
    }

    #[tokio::test]
    async fn test_model_failure_propagates_and_terminates() {
        let model = ScriptedModel::with_results(vec![Err(ReelcrewError::Model(
            "connection refused".to_string(),
        ))]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team();

        let result = team.run(&model, &tools, "task", &mut |_| {}).await;

        assert_err!(&result);
        assert_eq!(team.state(), SchedulerState::Terminated);
    }

    #[tokio::test]
    async fn test_turn_budget_is_never_exceeded() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            ModelReply::text("working on voiceovers"),
            ModelReply::text("working on images"),
            ModelReply::text("working on the video"),
            ModelReply::text(SCRIPT),
            ModelReply::text("still working"),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team().with_max_turns(6);

        let result = assert_ok!(team.run(&model, &tools, "task", &mut |_| {}).await);

        assert_eq!(result.turns.len(), 6);
        // Round-robin wraps back to the script writer's slot after the director.
        assert_eq!(result.turns[4].speaker, "script_writer");
        assert_eq!(result.stop_reason, StopReason::MaxTurns { turns: 6 });
    }

    #[tokio::test]
    async fn test_new_run_starts_with_empty_transcript() {
        let model = ScriptedModel::new(vec![
            ModelReply::text(SCRIPT),
            ModelReply::text("TERMINATE"),
            ModelReply::text(SCRIPT),
            ModelReply::text("TERMINATE"),
        ]);
        let (tools, _recorder, _dir) = RecordingTools::context();
        let mut team = team();

        team.run(&model, &tools, "first", &mut |_| {}).await.unwrap();
        let second = team.run(&model, &tools, "second", &mut |_| {}).await.unwrap();

        assert_eq!(second.turns.len(), 2);
        // The second run's script writer sees only its system prompt and task.
        let request = &model.requests()[2];
        assert_eq!(request.messages.len(), 2);
    }

    #[test]
    fn test_empty_team_is_rejected() {
        assert!(RoundRobinTeam::new(vec![], TextMentionTermination::new("X"), 4).is_err());
    }
}
