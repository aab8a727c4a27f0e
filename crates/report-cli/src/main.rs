//! sentiment-report: headline sentiment and price change for one or more tickers.
//!
//! Usage:
//!   cargo run -p report-cli -- --symbols AAPL MSFT
//!   cargo run -p report-cli -- --symbols ZOMATO.NS --lexicon --json

mod render;

use analysis_orchestrator::{ClassifierBackend, PipelineConfig, SentimentPipeline};
use anyhow::{anyhow, Context};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_cli=info,analysis_orchestrator=info,warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let as_json = args.iter().any(|a| a == "--json");
    let force_lexicon = args.iter().any(|a| a == "--lexicon");

    let symbols: Vec<String> = match args.iter().position(|a| a == "--symbols") {
        Some(idx) => args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    if symbols.is_empty() {
        eprintln!("Usage:");
        eprintln!("  sentiment-report --symbols AAPL MSFT ...   Tickers to analyze");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --json       Print the full outcome as JSON");
        eprintln!("  --lexicon    Use the built-in word-list classifier");
        std::process::exit(1);
    }

    let mut config = PipelineConfig::from_env().context("invalid configuration")?;
    if force_lexicon {
        config.classifier_backend = ClassifierBackend::Lexicon;
    }
    let classifier = config.build_classifier()?;
    let pipeline = SentimentPipeline::from_config(&config, classifier)?;

    let mut failed = 0;
    for symbol in &symbols {
        match pipeline.analyze_ticker(symbol).await {
            Ok(outcome) => {
                if as_json {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                } else {
                    let summary = pipeline.controller().aggregator().describe(&outcome.report);
                    print!("{}", render::render_outcome(&outcome, &summary));
                }
            }
            Err(e) => {
                failed += 1;
                tracing::debug!("{} failed: {}", symbol, e);
                eprintln!("{}: {}", symbol, e.user_message());
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} of {} symbol(s) failed", failed, symbols.len()));
    }
    Ok(())
}
