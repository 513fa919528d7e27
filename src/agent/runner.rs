//! Single-turn agent execution with a bounded tool calling loop.

use super::role::RoleAgent;
use crate::error::Result;
use crate::model::{ChatMessage, ChatModel, ModelRequest, OutputSchema, ToolInvocation};
use crate::script::script_schema;
use crate::tools::{parse_tool_call, ToolContext};
use tracing::{debug, info, warn};

/// Name used for the task message in the transcript.
pub const TASK_SPEAKER: &str = "user";

/// Runs one agent turn against the shared model.
pub struct AgentRunner<'a> {
    model: &'a dyn ChatModel,
    tools: &'a ToolContext,
    max_tool_iterations: usize,
}

impl<'a> AgentRunner<'a> {
    /// Create a runner for one scheduling run.
    pub fn new(model: &'a dyn ChatModel, tools: &'a ToolContext) -> Self {
        Self {
            model,
            tools,
            max_tool_iterations: 1,
        }
    }

    /// Set maximum model calls per turn.
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max.max(1);
        self
    }

    /// Produce one message for `agent`.
    ///
    /// `history` is everything said so far in the run. `note` is appended as
    /// a final user message, used to re-ask after a rejected reply.
    pub async fn take_turn(
        &self,
        agent: &RoleAgent,
        task: &str,
        history: &[TurnRecord],
        note: Option<&str>,
    ) -> Result<TurnRecord> {
        let mut messages = build_messages(agent, task, history);
        if let Some(note) = note {
            messages.push(ChatMessage::user(Some(TASK_SPEAKER), note));
        }

        let tools = agent.role.tool().map(|t| vec![t.spec()]).unwrap_or_default();
        let output_schema = agent.role.wants_structured_output().then(|| OutputSchema {
            name: "script".to_string(),
            schema: script_schema(),
        });

        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            debug!("{} iteration {}", agent.name(), iterations);

            let reply = self
                .model
                .complete(ModelRequest {
                    messages: messages.clone(),
                    tools: tools.clone(),
                    output_schema: output_schema.clone(),
                })
                .await?;

            if reply.tool_calls.is_empty() {
                return Ok(TurnRecord {
                    speaker: agent.name().to_string(),
                    content: reply.content.unwrap_or_default(),
                    tool_calls: tool_calls_made,
                });
            }

            messages.push(ChatMessage::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });

            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for invocation in &reply.tool_calls {
                let record = self.execute_tool_call(agent, invocation).await;
                messages.push(ChatMessage::Tool {
                    call_id: invocation.id.clone(),
                    content: record.result.clone(),
                });
                results.push(record.result.clone());
                tool_calls_made.push(record);
            }

            if iterations >= self.max_tool_iterations {
                debug!(
                    "{} reached {} tool iteration(s), ending turn with tool results",
                    agent.name(),
                    iterations
                );
                return Ok(TurnRecord {
                    speaker: agent.name().to_string(),
                    content: results.join("\n"),
                    tool_calls: tool_calls_made,
                });
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(
        &self,
        agent: &RoleAgent,
        invocation: &ToolInvocation,
    ) -> ToolCallRecord {
        let name = &invocation.name;
        let arguments = &invocation.arguments;

        info!("{} calling tool: {} with args: {}", agent.name(), name, arguments);

        let outcome = match parse_tool_call(name, arguments) {
            Ok(tool) if Some(tool.kind()) != agent.role.tool() => {
                Err(format!("Tool '{}' is not available to {}", name, agent.name()))
            }
            Ok(tool) => self
                .tools
                .execute(&tool)
                .await
                .map_err(|e| format!("Tool error: {}", e)),
            Err(e) => Err(format!("Failed to parse tool call: {}", e)),
        };

        let (result, succeeded) = match outcome {
            Ok(output) => (output, true),
            Err(message) => {
                warn!("{}", message);
                (message, false)
            }
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
            succeeded,
        }
    }
}

/// Build the conversation an agent sees: its instructions, the task, and
/// every earlier turn. Its own turns are assistant messages; everyone else's
/// are named user messages.
fn build_messages(agent: &RoleAgent, task: &str, history: &[TurnRecord]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(agent.instructions.clone()));
    messages.push(ChatMessage::user(Some(TASK_SPEAKER), task));

    for turn in history {
        if turn.speaker == agent.name() {
            messages.push(ChatMessage::assistant(turn.content.clone()));
        } else {
            messages.push(ChatMessage::user(Some(turn.speaker.as_str()), turn.content.clone()));
        }
    }

    messages
}

/// One message in a run transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRecord {
    /// Role identity of the speaker.
    pub speaker: String,
    /// Final message content.
    pub content: String,
    /// Tool calls made while producing the message.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Record of a tool call made by an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned to the model.
    pub result: String,
    /// Whether the tool ran without error.
    pub succeeded: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
