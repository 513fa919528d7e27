//! OpenAI-compatible client construction.
//!
//! The chat model usually points at a local Ollama server, while the media
//! tools talk to the hosted OpenAI API. Both go through `create_client`.

use crate::error::{ReelcrewError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the given API base and key with a request timeout.
///
/// `None` for either value keeps the async-openai default, which reads
/// `OPENAI_API_KEY` from the environment and targets api.openai.com.
pub fn create_client(
    api_base: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ReelcrewError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_with_local_base() {
        let client = create_client(
            Some("http://localhost:11434/v1/"),
            Some("ollama"),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        );
        assert!(client.is_ok());
    }
}
