//! Role agents.
//!
//! A role agent is a crew member bound to a system prompt and at most one
//! media tool. Each turn it reads the run transcript, talks to the shared
//! chat model, and may call its tool before producing one message.

mod role;
mod runner;

pub use role::{Role, RoleAgent};
pub use runner::{AgentRunner, ToolCallRecord, TurnRecord, TASK_SPEAKER};
