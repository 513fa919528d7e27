//! Voiceover synthesis through the OpenAI speech API.

use crate::error::{ReelcrewError, Result};
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use std::path::Path;
use tracing::{debug, instrument};

/// Map a configured voice name to the API enum.
pub(super) fn parse_voice(name: &str) -> Result<Voice> {
    match name.to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        other => Err(ReelcrewError::Config(format!("Unknown voice: {}", other))),
    }
}

/// Map a configured speech model name to the API enum.
pub(super) fn parse_speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

/// Synthesize a single caption to an mp3 file.
#[instrument(skip(client, voice, model, text), fields(dest = %dest.display()))]
pub(super) async fn synthesize(
    client: &async_openai::Client<async_openai::config::OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
    text: &str,
    dest: &Path,
) -> Result<()> {
    debug!("Synthesizing {} characters", text.len());

    let request = CreateSpeechRequestArgs::default()
        .input(text)
        .model(model)
        .voice(voice)
        .response_format(SpeechResponseFormat::Mp3)
        .build()
        .map_err(|e| ReelcrewError::Voiceover(format!("Failed to build request: {}", e)))?;

    let response = client
        .audio()
        .speech(request)
        .await
        .map_err(|e| ReelcrewError::OpenAI(format!("Speech API error: {}", e)))?;

    response
        .save(dest)
        .await
        .map_err(|e| ReelcrewError::Voiceover(format!("Failed to save {}: {}", dest.display(), e)))
}
