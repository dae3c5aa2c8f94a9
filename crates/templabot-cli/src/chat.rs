//! One chat turn: gate the prompt, predict, parse the template for display.

use serde::Serialize;
use templabot_ai::Predict;
use templabot_core::{GREETING, GateOutcome, PromptGate, TemplateView};
use tracing::{info, warn};

/// What the chat shows in response to one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatReply {
    /// Empty prompt: introduce the bot.
    Greeting { message: String },
    /// Prompt too short: ask for more.
    Guidance { message: String },
    /// A template was found. `template` is the raw JSON offered for download.
    Template { title: String, template: String },
    /// Prediction or display failed; the next turn is unaffected.
    Failed { message: String },
}

/// Answer one prompt. The predictor is called at most once, and only for
/// prompts that pass the gate.
pub fn respond(gate: &PromptGate, predictor: &dyn Predict, prompt: &str) -> ChatReply {
    match gate.check(prompt) {
        GateOutcome::Empty => {
            return ChatReply::Greeting {
                message: GREETING.to_string(),
            };
        }
        GateOutcome::TooShort { .. } => {
            return ChatReply::Guidance {
                message: gate.guidance(),
            };
        }
        GateOutcome::Accepted => {}
    }

    let raw = match predictor.predict(prompt) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "prediction failed");
            return ChatReply::Failed {
                message: format!("Could not predict a template: {e}"),
            };
        }
    };

    match TemplateView::parse(&raw) {
        Ok(view) => {
            info!(title = %view.name, "template predicted");
            ChatReply::Template {
                title: view.name,
                template: view.raw,
            }
        }
        Err(e) => {
            warn!(error = %e, "predicted template cannot be displayed");
            ChatReply::Failed {
                message: format!("The predicted template is malformed: {e}"),
            }
        }
    }
}
