//! Run termination conditions.

/// Stops a run when an agent message mentions a sentinel token.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMentionTermination {
    token: String,
}

impl TextMentionTermination {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Case-sensitive substring match against a message body.
    pub fn is_met(&self, content: &str) -> bool {
        !self.token.is_empty() && content.contains(&self.token)
    }
}
