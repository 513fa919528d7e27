//! CLI output formatting utilities.

use crate::team::{StopReason, TaskResult, TeamEvent};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Streams a run's events to the console.
///
/// Each turn gets a speaker banner and a spinner while the model works.
#[derive(Default)]
pub struct TranscriptPrinter {
    spinner: Option<ProgressBar>,
}

impl TranscriptPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one event.
    pub fn handle(&mut self, event: TeamEvent) {
        match event {
            TeamEvent::RunStarted { task } => {
                println!("{}", banner("user"));
                println!("{}", task);
            }
            TeamEvent::TurnStarted { speaker, .. } => {
                println!("{}", banner(speaker));
                self.spinner = Some(Output::spinner(&format!("{} is working...", speaker)));
            }
            TeamEvent::ScriptRejected { attempt, reason } => {
                self.suspend(|| {
                    Output::warning(&format!("Script attempt {} rejected: {}", attempt, reason))
                });
            }
            TeamEvent::ScriptAccepted(_) => {}
            TeamEvent::ToolCalled { record, .. } => {
                self.clear_spinner();
                let mark = if record.succeeded {
                    style("✓").green()
                } else {
                    style("✗").red()
                };
                println!("{} {}", style(format!("[{}]", record.name)).dim(), mark);
            }
            TeamEvent::TurnFinished(record) => {
                self.clear_spinner();
                if !record.content.is_empty() {
                    println!("{}", record.content);
                }
            }
            TeamEvent::RunFinished(_) => {
                self.clear_spinner();
            }
        }
    }

    fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.spinner {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print the closing summary for a finished run.
    pub fn summary(result: &TaskResult) {
        println!();
        match &result.stop_reason {
            StopReason::TerminationToken { speaker } => {
                Output::success(&format!("Run finished: {} signalled completion", speaker));
            }
            StopReason::MaxTurns { turns } => {
                let failed = result
                    .turns
                    .iter()
                    .flat_map(|t| &t.tool_calls)
                    .filter(|c| !c.succeeded)
                    .count();
                if failed > 0 {
                    Output::warning(&format!(
                        "Run stopped after {} turns with {} failed tool call(s)",
                        turns, failed
                    ));
                } else {
                    Output::success(&format!("Run finished after {} turns", turns));
                }
            }
            StopReason::ScriptRejected { reason } => {
                Output::warning(&format!("Run incomplete, no usable script: {}", reason));
            }
        }

        if let Some(script) = &result.script {
            Output::kv("Topic", &script.topic);
            Output::kv("Takeaway", &script.takeaway);
        }
        Output::kv("Output", &result.output_dir.display().to_string());
    }
}

impl Drop for TranscriptPrinter {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}

/// Speaker banner, e.g. `---------- director ----------`.
pub fn banner(speaker: &str) -> String {
    format!("\n---------- {} ----------", speaker)
}
