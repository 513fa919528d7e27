//! Interactive driver: one crew run per line of input.

use super::crew::CrewSession;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, BufRead, Write};

/// Prompt shown before each task.
pub const PROMPT: &str = "Enter a message (type 'exit' to leave): ";

/// What a line of user input asks for.
#[derive(Debug, PartialEq)]
pub enum DriverInput {
    Exit,
    Empty,
    Task(String),
}

/// Whether the input ends the session. Case and surrounding whitespace are ignored.
pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("exit")
}

/// Classify one line read from the user.
pub fn classify_input(line: &str) -> DriverInput {
    let trimmed = line.trim();
    if is_exit_command(trimmed) {
        DriverInput::Exit
    } else if trimmed.is_empty() {
        DriverInput::Empty
    } else {
        DriverInput::Task(trimmed.to_string())
    }
}

/// Print the prompt and read one line. End of input counts as `exit`.
fn read_input<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> io::Result<DriverInput> {
    write!(writer, "{}", PROMPT)?;
    writer.flush()?;

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(DriverInput::Exit);
    }
    Ok(classify_input(&line))
}

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reelcrew doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let mut session = CrewSession::from_settings(&settings)?;

    println!("\n{}", style("Reelcrew").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "Give the crew a topic for a short video. Model: {}",
            session.model_name()
        ))
        .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let task = match read_input(&mut stdin.lock(), &mut stdout)? {
            DriverInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            DriverInput::Empty => continue,
            DriverInput::Task(task) => task,
        };

        // A failed run is reported and the session continues.
        if let Err(e) = session.run(&task).await {
            Output::error(&format!("Run failed: {}", e));
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_ignores_case_and_whitespace() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("  Exit \n"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
    }

    #[test]
    fn test_classify_input() {
        assert_eq!(classify_input("\n"), DriverInput::Empty);
        assert_eq!(classify_input(" eXiT\n"), DriverInput::Exit);
        assert_eq!(
            classify_input("  a cat learns to swim \n"),
            DriverInput::Task("a cat learns to swim".to_string())
        );
    }

    #[test]
    fn test_read_input_prompts_and_treats_eof_as_exit() {
        let mut out = Vec::new();
        let input = read_input(&mut "a dog\n".as_bytes(), &mut out).unwrap();
        assert_eq!(input, DriverInput::Task("a dog".to_string()));
        assert_eq!(String::from_utf8(out).unwrap(), PROMPT);

        let mut out = Vec::new();
        assert_eq!(read_input(&mut "".as_bytes(), &mut out).unwrap(), DriverInput::Exit);
    }
}
