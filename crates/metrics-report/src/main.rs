//! metrics-report: replay a recorded model extraction against a document and
//! print the reconciled metrics record.
//!
//! Usage:
//!   cargo run -p metrics-report -- --text filing.txt --ai model_output.txt
//!   cargo run -p metrics-report -- --text filing.txt --ai model_output.txt --live snapshot.json
//!   cargo run -p metrics-report -- --text filing.txt --ai model_output.txt --ticker AAPL
//!   cargo run -p metrics-report -- --text filing.txt --ai model_output.txt --report-only

use analysis_core::{AnalysisError, LiveDataSource, TextGenerator};
use analysis_orchestrator::{DocumentSession, EngineConfig, MetricsOrchestrator};
use anyhow::{Context, Result};
use async_trait::async_trait;
use live_data::{AlphaVantageClient, StaticSnapshotSource};
use std::path::Path;

/// Text generator that answers every prompt with a recorded model response.
struct ReplayGenerator {
    output: String,
}

#[async_trait]
impl TextGenerator for ReplayGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        tracing::debug!("Replaying recorded output for a {}-char prompt", prompt.len());
        Ok(self.output.clone())
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn read_file(path: &str) -> Result<String> {
    std::fs::read_to_string(Path::new(path)).with_context(|| format!("Failed to read {}", path))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  metrics-report --text DOC --ai MODEL_OUTPUT [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --live FILE     Recorded live snapshot (JSON object)");
    eprintln!("  --ticker SYM    Ticker; fetches Alpha Vantage data when ALPHA_VANTAGE_API_KEY is set");
    eprintln!("  --report-only   Print only the validation report");
}

fn init_logging() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "metrics_report=info,analysis_orchestrator=info".into());

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let (Some(text_path), Some(ai_path)) = (flag_value(&args, "--text"), flag_value(&args, "--ai")) else {
        print_usage();
        std::process::exit(2);
    };
    let ticker = flag_value(&args, "--ticker");
    let report_only = args.iter().any(|a| a == "--report-only");

    let config = EngineConfig::from_env().context("Invalid engine configuration")?;

    let session = DocumentSession::new(read_file(text_path)?);
    let generator = ReplayGenerator {
        output: read_file(ai_path)?,
    };

    let recorded = flag_value(&args, "--live")
        .map(StaticSnapshotSource::from_path)
        .transpose()?;
    // A recorded snapshot names its own ticker when none is given
    let ticker = ticker
        .map(str::to_string)
        .or_else(|| recorded.as_ref().and_then(|s| s.ticker()).map(str::to_string));

    let live_source: Option<Box<dyn LiveDataSource>> = match recorded {
        Some(source) => Some(Box::new(source)),
        None => match (&config.alpha_vantage_api_key, ticker.as_deref()) {
            (Some(key), Some(_)) => Some(Box::new(AlphaVantageClient::new(key.clone()))),
            (None, Some(t)) => {
                tracing::warn!("No ALPHA_VANTAGE_API_KEY set, skipping live data for {}", t);
                None
            }
            _ => None,
        },
    };

    let mut orchestrator = MetricsOrchestrator::new(Box::new(generator), config);
    if let Some(source) = live_source {
        orchestrator = orchestrator.with_live_source(source);
    }

    let record = orchestrator.extract_metrics(&session, ticker.as_deref()).await?;

    let output = if report_only {
        record
            .get("_validation")
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::to_value(&record)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
