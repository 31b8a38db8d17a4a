mod app;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use skill_constellation::EngineConfig;
use skill_constellation::engine::CatalogProvider;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of skill records. Defaults to the bundled sample.
    #[arg(long)]
    skills: Option<PathBuf>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed seed for suggestion sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Artificial delay added to every suggestion lookup.
    #[arg(long, default_value_t = 600)]
    suggestion_latency_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.suggestions.seed = args.seed;
    }

    let provider = Arc::new(CatalogProvider::with_latency(Duration::from_millis(
        args.suggestion_latency_ms,
    )));

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "skill constellation",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::SkillGraphApp::new(
                cc,
                args.skills.clone(),
                config.clone(),
                provider.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
