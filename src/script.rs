//! The short-video script produced by the script writer.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Number of captions every script carries.
pub const CAPTION_COUNT: usize = 5;

/// Soft limit on caption length. Longer captions are logged, not rejected.
pub const MAX_CAPTION_WORDS: usize = 8;

/// A five-caption script for a short video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub topic: String,
    pub takeaway: String,
    pub captions: Vec<String>,
}

/// Reasons a structured reply could not be accepted as a script.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    #[error("reply was empty")]
    Empty,

    #[error("reply is not a valid script object: {0}")]
    Malformed(String),

    #[error("expected {expected} captions, got {actual}")]
    CaptionCount { expected: usize, actual: usize },

    #[error("caption {0} is blank")]
    BlankCaption(usize),
}

impl Script {
    /// Parse and validate a model reply.
    ///
    /// Accepts bare JSON or JSON wrapped in a Markdown code fence.
    pub fn parse(reply: &str) -> Result<Self, ScriptError> {
        let body = strip_code_fence(reply.trim());
        if body.is_empty() {
            return Err(ScriptError::Empty);
        }

        let script: Script =
            serde_json::from_str(body).map_err(|e| ScriptError::Malformed(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    /// Check the structural invariants of the script.
    pub fn validate(&self) -> Result<(), ScriptError> {
        if self.captions.len() != CAPTION_COUNT {
            return Err(ScriptError::CaptionCount {
                expected: CAPTION_COUNT,
                actual: self.captions.len(),
            });
        }
        if let Some(idx) = self.captions.iter().position(|c| c.trim().is_empty()) {
            return Err(ScriptError::BlankCaption(idx + 1));
        }
        Ok(())
    }

    /// One-based indices of captions longer than [`MAX_CAPTION_WORDS`].
    pub fn long_captions(&self) -> Vec<usize> {
        self.captions
            .iter()
            .enumerate()
            .filter(|(_, c)| c.split_whitespace().count() > MAX_CAPTION_WORDS)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Captions reduced to alphanumerics and spaces, as the director uses them.
    pub fn sanitized_captions(&self) -> Vec<String> {
        self.captions.iter().map(|c| sanitize_caption(c)).collect()
    }
}

/// JSON schema sent with the script writer's requests.
pub fn script_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "topic": { "type": "string" },
            "takeaway": { "type": "string" },
            "captions": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": CAPTION_COUNT,
                "maxItems": CAPTION_COUNT
            }
        },
        "required": ["topic", "takeaway", "captions"],
        "additionalProperties": false
    })
}

/// Strip everything except ASCII/Unicode alphanumerics and spaces.
///
/// Runs of spaces left behind by removed punctuation are collapsed.
pub fn sanitize_caption(caption: &str) -> String {
    static DISALLOWED: OnceLock<regex::Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| {
        regex::Regex::new(r"[^\p{Alphabetic}\p{Nd} ]").expect("static regex is valid")
    });

    re.replace_all(caption, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop an optional language tag on the opening fence.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "topic": "A lost dog finds its way home",
        "takeaway": "Loyalty always finds a path",
        "captions": [
            "Ever wondered how far loyalty goes?",
            "Max wandered off on a stormy night",
            "He followed scents through the city",
            "Strangers helped him along the way",
            "Home is where his heart led"
        ]
    }"#;

    #[test]
    fn test_parse_valid_script() {
        let script = Script::parse(VALID).unwrap();
        assert_eq!(script.captions.len(), CAPTION_COUNT);
        assert_eq!(script.topic, "A lost dog finds its way home");
        assert!(script.long_captions().is_empty());
    }

    #[test]
    fn test_parse_fenced_script() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(Script::parse(&fenced).is_ok());
    }

    #[test]
    fn test_wrong_caption_count_is_rejected() {
        let reply = r#"{"topic": "t", "takeaway": "k", "captions": ["a", "b", "c"]}"#;
        assert_eq!(
            Script::parse(reply),
            Err(ScriptError::CaptionCount { expected: 5, actual: 3 })
        );
    }

    #[test]
    fn test_blank_caption_is_rejected() {
        let reply = r#"{"topic": "t", "takeaway": "k", "captions": ["a", "b", " ", "d", "e"]}"#;
        assert_eq!(Script::parse(reply), Err(ScriptError::BlankCaption(3)));
    }

    #[test]
    fn test_malformed_and_empty_replies() {
        assert_eq!(Script::parse("   "), Err(ScriptError::Empty));
        assert!(matches!(
            Script::parse("Here is your script!"),
            Err(ScriptError::Malformed(_))
        ));
    }

    #[test]
    fn test_long_captions_are_reported() {
        let script = Script {
            topic: "t".into(),
            takeaway: "k".into(),
            captions: vec![
                "one two three".into(),
                "this caption has far more than eight words in it".into(),
                "c".into(),
                "d".into(),
                "e".into(),
            ],
        };
        assert!(script.validate().is_ok());
        assert_eq!(script.long_captions(), vec![2]);
    }

    #[test]
    fn test_sanitize_caption() {
        assert_eq!(sanitize_caption("Ever wondered... why?"), "Ever wondered why");
        assert_eq!(sanitize_caption("Max's   journey - home!"), "Maxs journey home");
        assert_eq!(sanitize_caption("Café 24/7"), "Café 247");
        assert_eq!(sanitize_caption("!!!"), "");
    }

    #[test]
    fn test_schema_pins_caption_count() {
        let schema = script_schema();
        assert_eq!(schema["properties"]["captions"]["minItems"], 5);
        assert_eq!(schema["properties"]["captions"]["maxItems"], 5);
    }
}
