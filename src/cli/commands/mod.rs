//! CLI command implementations.

mod chat;
mod config;
mod crew;
mod doctor;
mod once;

pub use chat::{classify_input, is_exit_command, run_chat, DriverInput, PROMPT};
pub use config::run_config;
pub use doctor::run_doctor;
pub use once::run_once;
