//! Train and evaluate the fake news classifiers on a labeled CSV
//!
//! Usage: cargo run --release --bin detect_fake_news -- --data news.csv --config config/pipeline.toml

use anyhow::{Context, Result};
use clap::Parser;
use fake_news_ml::prelude::*;
use fake_news_ml::load_config;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Classify news articles as real or fake")]
struct Args {
    /// CSV with title, content (or text) and label columns
    #[arg(short, long)]
    data: PathBuf,

    /// Pipeline configuration (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fake_news_ml=info")),
        )
        .init();

    let args = Args::parse();

    println!("===========================================");
    println!("  Fake News Detection");
    println!("===========================================\n");

    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }

    info!("Loading {}", args.data.display());
    let corpus = Corpus::load_csv(&args.data).with_context(|| format!("reading {}", args.data.display()))?;
    let [real, fake] = corpus.class_counts();
    println!("Loaded {} documents ({} real, {} fake)\n", corpus.len(), real, fake);

    let start_time = std::time::Instant::now();
    let report = Pipeline::new(config)?.run(&corpus)?;
    println!("{}", report);
    println!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}
