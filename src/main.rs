use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use sectionbayes::{ClassifierConfig, MalformedPolicy};
use tracing::{error, info};

/// Train a section/class multinomial Naive Bayes model and predict the top
/// classes of every test document.
#[derive(Parser, Debug)]
#[command(name = "sectionbayes")]
#[command(version)]
struct Args {
    /// Training file: one `c1,c2 f:v f:v` document per line
    train: PathBuf,

    /// Test file, same format; the class field is only used for evaluation
    test: PathBuf,

    /// Results file, one line of top classes per test document
    results: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documents per flush of the results buffer
    #[arg(long)]
    batch_size: Option<usize>,

    /// Classes emitted per document
    #[arg(long)]
    top_k: Option<usize>,

    /// Skip malformed lines with a warning instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Log top-1 / top-k hit rates against the test file's own labels
    #[arg(long)]
    evaluate: bool,
}

fn load_config(args: &Args) -> Result<ClassifierConfig> {
    let mut config = match &args.config {
        Some(path) => ClassifierConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClassifierConfig::default(),
    };

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if args.skip_malformed {
        config.on_malformed = MalformedPolicy::Skip;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let top_k = config.top_k;

    let summary = sectionbayes::run(&args.train, &args.test, &args.results, config)
        .context("Classification run failed")?;

    info!(
        trained = summary.fit.documents,
        predicted = summary.prediction.documents,
        skipped = summary.fit.skipped + summary.prediction.skipped,
        "done"
    );

    if args.evaluate {
        let accuracy = summary.prediction.accuracy;
        info!(
            documents = accuracy.documents(),
            top1 = accuracy.top1(),
            topk = accuracy.topk(),
            k = top_k,
            "evaluation"
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sectionbayes=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
