//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use templabot_ai::ArtifactPaths;
use templabot_core::{DEFAULT_MIN_PROMPT_CHARS, PromptGate};

#[derive(Debug, Parser)]
#[command(
    name = "templabot",
    version,
    about = "Pick the WhatsApp message template that matches a prompt"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the chat UI over HTTP.
    Serve(ServeArgs),
    /// Predict a template for one prompt.
    Predict(PredictArgs),
    /// Load the artifacts and report their shapes.
    Inspect(ArtifactArgs),
}

/// Artifact locations. Individual paths override the model directory.
#[derive(Debug, Clone, Args)]
pub struct ArtifactArgs {
    #[arg(long, env = "TEMPLABOT_MODEL_DIR", default_value = "models")]
    pub model_dir: PathBuf,

    #[arg(long, env = "TEMPLABOT_VECTORIZER")]
    pub vectorizer: Option<PathBuf>,

    #[arg(long, env = "TEMPLABOT_CLASSIFIER")]
    pub classifier: Option<PathBuf>,

    #[arg(long, env = "TEMPLABOT_LABELS")]
    pub labels: Option<PathBuf>,
}

impl ArtifactArgs {
    pub fn paths(&self) -> ArtifactPaths {
        let defaults = ArtifactPaths::in_dir(&self.model_dir);
        ArtifactPaths {
            vectorizer: self.vectorizer.clone().unwrap_or(defaults.vectorizer),
            classifier: self.classifier.clone().unwrap_or(defaults.classifier),
            labels: self.labels.clone().unwrap_or(defaults.labels),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct GateArgs {
    /// Prompts shorter than this many characters are not classified.
    #[arg(long, env = "TEMPLABOT_MIN_PROMPT_CHARS", default_value_t = DEFAULT_MIN_PROMPT_CHARS)]
    pub min_prompt_chars: usize,
}

impl GateArgs {
    pub fn gate(&self) -> PromptGate {
        PromptGate::new(self.min_prompt_chars)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[arg(long, env = "TEMPLABOT_BIND", default_value = "0.0.0.0:8501")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub gate: GateArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// The prompt describing the template you want.
    pub prompt: String,

    /// Also write the template to this file (e.g. template.json).
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub artifacts: ArtifactArgs,

    #[command(flatten)]
    pub gate: GateArgs,
}
