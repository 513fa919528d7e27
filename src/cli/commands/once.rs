//! Once command - a single crew run without the interactive loop.

use super::crew::CrewSession;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::ReelcrewError;
use crate::team::StopReason;

/// Run the crew on one task.
///
/// Fails when the run produced no usable script.
pub async fn run_once(task: &str, settings: Settings) -> anyhow::Result<()> {
    let task = task.trim();
    if task.is_empty() {
        return Err(ReelcrewError::InvalidInput("Task must not be empty".to_string()).into());
    }

    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reelcrew doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let mut session = CrewSession::from_settings(&settings)?;
    let result = session.run(task).await?;

    if let StopReason::ScriptRejected { reason } = result.stop_reason {
        return Err(ReelcrewError::Script(reason).into());
    }
    Ok(())
}
