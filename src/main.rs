//! Reader Intent - trace replay and inspection CLI

use reader_intent::app::cli::{Cli, Commands, ConfigAction};
use reader_intent::app::config::EngineConfig;
use reader_intent::arbiter::SessionFlags;
use reader_intent::augment::HttpAugmentClient;
use reader_intent::engine::{replay, ReplayOptions, Trace};
use reader_intent::page::StaticContent;
use reader_intent::present::LogPresenter;
use reader_intent::telemetry::MemorySink;
use reader_intent::IntentEngine;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so --verbose can set the log level
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = if let Some(path) = &cli.config {
        EngineConfig::load(path)?
    } else {
        EngineConfig::load_default()?
    };

    match cli.command {
        Commands::Replay { input, offline } => {
            run_replay(&input, offline, &config).await?;
        }
        Commands::Inspect { input } => {
            run_inspect(&input)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", config.to_toml()?);
            }
        },
    }

    Ok(())
}

async fn run_replay(input: &PathBuf, offline: bool, config: &EngineConfig) -> anyhow::Result<()> {
    let trace = Trace::load(input)?;
    info!(
        name = %trace.metadata.name,
        events = trace.metadata.event_count,
        "replaying trace"
    );

    let sink = MemorySink::new();
    let content = StaticContent::new(trace.page.url.clone(), trace.page.text.clone());
    let mut engine = IntentEngine::new(
        config,
        LogPresenter,
        &sink,
        content,
        SessionFlags::default(),
    );

    let client = HttpAugmentClient::new(
        config.augment.base_url.clone(),
        config.augment.timeout_ms,
        config.augment.max_attempts,
    );
    let options = ReplayOptions {
        offline,
        ..ReplayOptions::default()
    };

    let summary = replay(&trace, &mut engine, &client, &sink, options).await;

    println!("Replayed {} events", summary.events);
    println!(
        "Enrichment jobs: {} produced, {} resolved",
        summary.jobs, summary.resolved
    );
    if summary.decisions.is_empty() {
        println!("No intents fired.");
    } else {
        println!("Decisions:");
        for (event_type, count) in &summary.decisions {
            println!("  {event_type}: {count}");
        }
    }
    let stats = engine.sampler_stats();
    println!(
        "Samples: {} accepted, {} dropped",
        stats.accepted, stats.dropped
    );

    Ok(())
}

fn run_inspect(input: &PathBuf) -> anyhow::Result<()> {
    let trace = Trace::load(input)?;

    println!("Trace:      {}", trace.metadata.name);
    println!("Id:         {}", trace.metadata.id);
    println!("Captured:   {}", trace.metadata.captured_at);
    println!("Page:       {}", trace.page.url);
    println!("Events:     {}", trace.metadata.event_count);
    println!("Duration:   {} ms", trace.metadata.duration_ms);
    println!("Format:     {}", trace.metadata.format_version);

    let mut counts = std::collections::BTreeMap::new();
    for event in &trace.events {
        *counts.entry(format!("{:?}", event.kind())).or_insert(0usize) += 1;
    }
    for (kind, count) in counts {
        println!("  {kind}: {count}");
    }

    Ok(())
}

fn run_init(force: bool, config: &EngineConfig) -> anyhow::Result<()> {
    let path = EngineConfig::default_path();
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config.save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
