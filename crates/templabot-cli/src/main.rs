mod chat;
mod config;
mod display;
mod server;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use templabot_ai::{ArtifactStore, Artifacts, TemplatePredictor};
use templabot_core::TemplateView;
use tracing_subscriber::EnvFilter;

use crate::chat::{ChatReply, respond};
use crate::config::{ArtifactArgs, Cli, Command, PredictArgs, ServeArgs};
use crate::server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("templabot v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

/// Load every artifact up front; without all three there is nothing to serve.
fn load_artifacts(args: &ArtifactArgs) -> anyhow::Result<Artifacts> {
    ArtifactStore::new(args.paths())
        .load_all()
        .with_context(|| format!("loading artifacts from {}", args.model_dir.display()))
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let artifacts = load_artifacts(&args.artifacts)?;
    let state = Arc::new(AppState {
        predictor: Arc::new(TemplatePredictor::new(artifacts)),
        gate: args.gate.gate(),
    });
    server::serve(args.bind, state).await
}

fn run_predict(args: PredictArgs) -> anyhow::Result<()> {
    let predictor = TemplatePredictor::new(load_artifacts(&args.artifacts)?);

    match respond(&args.gate.gate(), &predictor, &args.prompt) {
        ChatReply::Template { template, .. } => {
            let view = TemplateView::parse(&template)?;
            print!("{}", display::template_card(&view));
            if let Some(path) = &args.output {
                std::fs::write(path, &view.raw)
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("  Saved template to {}", path.display());
            }
            Ok(())
        }
        ChatReply::Greeting { message } | ChatReply::Guidance { message } => {
            println!("{message}");
            Ok(())
        }
        ChatReply::Failed { message } => anyhow::bail!(message),
    }
}

fn run_inspect(args: ArtifactArgs) -> anyhow::Result<()> {
    let artifacts = load_artifacts(&args)?;
    print!("{}", display::artifact_report(&args.paths(), &artifacts));
    Ok(())
}
