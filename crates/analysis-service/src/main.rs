//! Game analysis CLI
//!
//! Loads a PGN file, runs engine evaluation and LLM commentary against the
//! configured collaborators, and prints the assembled report as JSON.

use anyhow::Context;
use tracing::{info, warn};

use analysis_service::cache::AnalysisCache;
use analysis_service::commentary::CommentaryClient;
use analysis_service::config::AnalysisConfig;
use analysis_service::orchestrator::{self, DepthPolicy};
use analysis_service::stockfish::StockfishEngine;
use chess_core::openings::OpeningBook;

/// Parse `<pgn-file> [--depth minimal|standard|deep]` from CLI args
fn parse_args() -> Result<(String, DepthPolicy), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut pgn_path = None;
    let mut policy = DepthPolicy::default();

    let mut i = 0;
    while i < args.len() {
        if args[i] == "--depth" {
            let value = args
                .get(i + 1)
                .ok_or_else(|| "--depth requires a value".to_string())?;
            policy = value.parse()?;
            i += 2;
        } else {
            pgn_path = Some(args[i].clone());
            i += 1;
        }
    }

    match pgn_path {
        Some(path) => Ok((path, policy)),
        None => Err("usage: analyze <pgn-file> [--depth minimal|standard|deep]".to_string()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let (pgn_path, policy) = parse_args().map_err(anyhow::Error::msg)?;

    let pgn_text = std::fs::read_to_string(&pgn_path)
        .with_context(|| format!("failed to read {pgn_path}"))?;

    let config = AnalysisConfig::load();
    info!(
        stockfish_path = %config.stockfish_path,
        depth = config.search_depth,
        multipv = config.multipv,
        "Config loaded"
    );

    let mut engine = match StockfishEngine::new(&config.stockfish_path).await {
        Ok(engine) => Some(engine),
        Err(e) => {
            warn!(error = %e, "Engine unavailable, evaluations will be skipped");
            None
        }
    };

    let commentary = CommentaryClient::new(&config);
    if !commentary.available() {
        warn!("GROQ_API_KEY not set, commentary will be skipped");
    }

    let book = OpeningBook::default();
    let mut cache = AnalysisCache::new();

    let report = orchestrator::analyze_game(
        &pgn_text,
        policy,
        &config,
        engine.as_mut(),
        &commentary,
        &book,
        &mut cache,
    )
    .await
    .context("game analysis failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(engine) = engine.as_mut() {
        engine.quit().await;
    }

    Ok(())
}
