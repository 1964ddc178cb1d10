use anyhow::{Context, Result};
use clap::Parser;
use deepsearch_pdf::models::{ProgressEvent, StepStatus};
use deepsearch_pdf::sources::{ArxivClient, CrossrefClient, WikipediaClient};
use deepsearch_pdf::utils::HttpClient;
use deepsearch_pdf::{compose, suggested_filename, DeepSearch};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Deep-search a topic across Wikipedia, arXiv and Crossref and generate a
/// citation-annotated PDF report
#[derive(Parser, Debug)]
#[command(name = "deepsearch-pdf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate a citation-annotated PDF research report for a topic", long_about = None)]
struct Cli {
    /// Topic or niche to research
    query: String,

    /// Output file path (default: derived from the query)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Maximum entries to keep per list source
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Print the aggregated result as JSON instead of writing a PDF
    #[arg(long)]
    json: bool,

    /// Enable verbose logging (-v, -vv for more)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let http = Arc::new(HttpClient::new());
    let search = DeepSearch::with_clients(
        WikipediaClient::new(Arc::clone(&http)),
        ArxivClient::new(Arc::clone(&http)).limit(cli.limit),
        CrossrefClient::new(http).limit(cli.limit),
    );

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let status = match event.status {
                StepStatus::Idle => "idle",
                StepStatus::Running => "running",
                StepStatus::Done => "done",
                StepStatus::Error => "no result",
            };
            match &event.detail {
                Some(detail) => eprintln!("{:12} {} ({})", event.source.name(), status, detail),
                None => eprintln!("{:12} {}", event.source.name(), status),
            }
        }
    });

    let result = search
        .run_with_progress(&cli.query, Some(tx))
        .await
        .context("Deep search failed")?;
    let _ = reporter.await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let bytes = compose(&result).context("Failed to compose PDF")?;
    let path = cli
        .output
        .unwrap_or_else(|| PathBuf::from(suggested_filename(&result.query)));
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
