//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
///
/// `config_path` is the `--config` file if one was given.
pub async fn run_doctor(settings: &Settings, config_path: Option<&Path>) -> anyhow::Result<()> {
    Output::header("Reelcrew Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Chat Model").bold());
    let model_check = check_model_endpoint(settings).await;
    model_check.print();
    checks.push(model_check);

    println!();

    println!("{}", style("Media Tools").bold());
    let tool_checks = vec![
        check_ffmpeg(&settings.tools.ffmpeg_path),
        check_openai_api_key(std::env::var("OPENAI_API_KEY").ok().as_deref(), settings),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Files").bold());
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);
    let file_checks = vec![check_output_dir(settings), check_config_file(&config_path)];
    for check in &file_checks {
        check.print();
    }
    checks.extend(file_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running the crew.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! The crew is ready.");
    }

    Ok(())
}

/// Check that the chat endpoint answers and serves the configured model.
async fn check_model_endpoint(settings: &Settings) -> CheckResult {
    let name = format!("Model endpoint ({})", settings.model.base_url);
    let url = format!("{}/models", settings.model.base_url.trim_end_matches('/'));
    let hint = "Start Ollama with: ollama serve (or set model.base_url)";

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => return CheckResult::error(&name, &format!("error: {}", e), hint),
    };

    let response = match client
        .get(&url)
        .bearer_auth(&settings.model.api_key)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return CheckResult::error(&name, &format!("unreachable: {}", e), hint),
    };

    if !response.status().is_success() {
        return CheckResult::error(&name, &format!("HTTP {}", response.status()), hint);
    }

    match response.json::<serde_json::Value>().await {
        Ok(body) if lists_model(&body, &settings.model.name) => {
            CheckResult::ok(&name, &format!("serving {}", settings.model.name))
        }
        Ok(_) => CheckResult::warning(
            &name,
            &format!("reachable, but {} is not listed", settings.model.name),
            &format!("Pull it with: ollama pull {}", settings.model.name),
        ),
        Err(_) => CheckResult::warning(&name, "reachable, unexpected model list", hint),
    }
}

/// Whether an OpenAI-style `/models` response lists `model`.
fn lists_model(body: &serde_json::Value, model: &str) -> bool {
    body.get("data")
        .and_then(|d| d.as_array())
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
                .any(|id| id == model)
        })
        .unwrap_or(false)
}

/// Check that ffmpeg is available.
fn check_ffmpeg(ffmpeg: &str) -> CheckResult {
    let hint = install_hint_ffmpeg();
    match Command::new(ffmpeg).arg("-version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok("ffmpeg", &version_display)
        }
        Ok(_) => CheckResult::error("ffmpeg", "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error("ffmpeg", "not found", hint)
        }
        Err(e) => CheckResult::error("ffmpeg", &format!("error: {}", e), hint),
    }
}

/// Check the key used for speech and image generation.
fn check_openai_api_key(key: Option<&str>, settings: &Settings) -> CheckResult {
    let name = "OPENAI_API_KEY";
    let set_hint = "Set with: export OPENAI_API_KEY='sk-...'";

    if let Some(base) = &settings.tools.api_base {
        if key.map_or(true, str::is_empty) {
            return CheckResult::warning(
                name,
                "not set",
                &format!("Only needed if {} requires a key", base),
            );
        }
    }

    match key {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(name, &format!("configured ({})", masked))
        }
        Some("") => CheckResult::error(name, "empty", set_hint),
        Some(_) => CheckResult::warning(
            name,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::error(name, "not set", set_hint),
    }
}

/// Check the output directory.
fn check_output_dir(settings: &Settings) -> CheckResult {
    let output_dir = settings.output_dir();
    if output_dir.exists() {
        let runs = std::fs::read_dir(&output_dir)
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0);
        CheckResult::ok(
            "Output directory",
            &format!("{} ({} run(s))", output_dir.display(), runs),
        )
    } else {
        CheckResult::warning(
            "Output directory",
            &format!("{} (will be created)", output_dir.display()),
            "Directory will be created on the first run",
        )
    }
}

/// Check if the config file in use exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: reelcrew config init",
        )
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_lists_model() {
        let body = serde_json::json!({
            "object": "list",
            "data": [{"id": "llama3.1:latest"}, {"id": "mistral:7b"}]
        });
        assert!(lists_model(&body, "llama3.1:latest"));
        assert!(!lists_model(&body, "qwen2.5"));
        assert!(!lists_model(&serde_json::json!({}), "llama3.1:latest"));
    }

    #[test]
    fn test_api_key_checks() {
        let settings = Settings::default();
        let key = "sk-abcdefghijklmnopqrstuvwxyz";
        assert_eq!(check_openai_api_key(Some(key), &settings).status, CheckStatus::Ok);
        assert_eq!(check_openai_api_key(None, &settings).status, CheckStatus::Error);

        let mut custom = Settings::default();
        custom.tools.api_base = Some("http://localhost:8000/v1".to_string());
        assert_eq!(check_openai_api_key(None, &custom).status, CheckStatus::Warning);
    }

    #[test]
    fn test_config_file_check_uses_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let missing = check_config_file(&path);
        assert_eq!(missing.status, CheckStatus::Warning);

        std::fs::write(&path, "[team]\nmax_turns = 4\n").unwrap();
        let found = check_config_file(&path);
        assert_eq!(found.status, CheckStatus::Ok);
        assert_eq!(found.message, path.display().to_string());
    }

    #[test]
    fn test_missing_ffmpeg() {
        let result = check_ffmpeg("reelcrew-no-such-ffmpeg");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.message, "not found");
    }
}
