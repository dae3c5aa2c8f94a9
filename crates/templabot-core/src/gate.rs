//! Minimum-length gate applied to chat prompts before prediction.
//!
//! Prompts are counted in Unicode scalar values, so "héllo" is five
//! characters regardless of its UTF-8 byte length.

use tracing::debug;

/// Canonical minimum prompt length, in characters.
pub const DEFAULT_MIN_PROMPT_CHARS: usize = 20;

/// Shown when the chat is opened or an empty prompt is submitted.
pub const GREETING: &str = "I am a chatbot that provides a template for your WhatsApp campaign. \
     Describe the template you want and I will find the closest match.";

/// Outcome of gating a single prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Nothing was typed.
    Empty,
    /// Text was typed but is shorter than the minimum.
    TooShort { len: usize, min: usize },
    /// Long enough to send to the prediction pipeline.
    Accepted,
}

/// Length gate in front of the prediction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptGate {
    min_chars: usize,
}

impl Default for PromptGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PROMPT_CHARS)
    }
}

impl PromptGate {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    pub fn min_chars(&self) -> usize {
        self.min_chars
    }

    /// Classify a prompt against the gate.
    ///
    /// Whitespace is not trimmed: a prompt of spaces counts as typed text.
    pub fn check(&self, prompt: &str) -> GateOutcome {
        if prompt.is_empty() {
            return GateOutcome::Empty;
        }
        let len = prompt.chars().count();
        if len < self.min_chars {
            debug!(len, min = self.min_chars, "prompt rejected by length gate");
            return GateOutcome::TooShort {
                len,
                min: self.min_chars,
            };
        }
        GateOutcome::Accepted
    }

    /// Placeholder for the chat input box.
    pub fn placeholder(&self) -> String {
        format!(
            "Describe the template you want (at least {} characters)...",
            self.min_chars
        )
    }

    /// User-facing message asking for a longer prompt.
    pub fn guidance(&self) -> String {
        format!(
            "Please provide a valid prompt of at least {} characters or 5 words...",
            self.min_chars
        )
    }
}
