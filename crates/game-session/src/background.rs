//! Background full-game analysis with atomic report publish.
//!
//! The worker computes the entire report before sending it over a oneshot
//! channel, so the session never observes partially written fields. Each
//! request is tagged with the game generation it was issued for; a result
//! arriving after a new game load is recognized as stale and dropped.

use tokio::sync::oneshot;
use tracing::warn;

use analysis_service::cache::AnalysisCache;
use analysis_service::commentary::CommentaryClient;
use analysis_service::config::AnalysisConfig;
use analysis_service::orchestrator::{self, DepthPolicy, GameReport};
use analysis_service::stockfish::StockfishEngine;
use chess_core::openings::OpeningBook;

use crate::session::Session;

pub(crate) struct PendingAnalysis {
    pub(crate) generation: u64,
    pub(crate) rx: oneshot::Receiver<Result<GameReport, String>>,
}

impl Session {
    /// Kick off full-game analysis for the loaded game. Must be called from
    /// within a tokio runtime. A no-op when analysis is already running or
    /// nothing is loaded.
    pub fn start_analysis(&mut self) {
        if self.analysis_in_progress {
            self.debug.add("Analysis already in progress");
            return;
        }
        let Some(game) = self.game.as_ref() else {
            self.debug.add("No game loaded, nothing to analyze");
            return;
        };

        let pgn = game.pgn.clone();
        let policy = self.depth_policy;
        let config = self.config.clone();
        let (tx, rx) = oneshot::channel();

        self.analysis_in_progress = true;
        self.analysis_error = None;
        self.pending = Some(PendingAnalysis {
            generation: self.generation,
            rx,
        });
        self.debug.add("Starting analysis");

        tokio::spawn(async move {
            let result = run_analysis(&pgn, policy, &config).await;
            // The receiver is gone when the session was reset meanwhile.
            let _ = tx.send(result);
        });
    }

    /// Collect a finished background analysis, if any. The report is published
    /// into session state in one piece, and only when it belongs to the game
    /// that is still loaded.
    pub fn poll_analysis(&mut self) {
        let Some(mut pending) = self.pending.take() else {
            return;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => {
                self.pending = Some(pending);
                return;
            }
            Err(oneshot::error::TryRecvError::Closed) => {
                self.analysis_in_progress = false;
                self.analysis_error = Some("analysis task died".to_string());
                return;
            }
        };

        self.analysis_in_progress = false;

        if pending.generation != self.generation {
            self.debug.add("Discarding stale analysis result");
            return;
        }

        match result {
            Ok(report) => {
                // Seed the session cache so navigation and overlays reuse the
                // background evaluations without fresh engine calls.
                for (fen, outcome) in &report.position_analyses {
                    self.cache.insert(fen, outcome.clone());
                }
                self.debug.add("Analysis completed");
                self.report = Some(report);
            }
            Err(error) => {
                self.debug.add(format!("Analysis error: {error}"));
                self.analysis_error = Some(error);
            }
        }
    }
}

/// The worker owns its own engine process and HTTP client; the session's
/// collaborators stay free for interactive use.
async fn run_analysis(
    pgn: &str,
    policy: DepthPolicy,
    config: &AnalysisConfig,
) -> Result<GameReport, String> {
    let mut engine = match StockfishEngine::new(&config.stockfish_path).await {
        Ok(engine) => Some(engine),
        Err(e) => {
            warn!(error = %e, "Engine unavailable for background analysis");
            None
        }
    };

    let commentary = CommentaryClient::new(config);
    let book = OpeningBook::default();
    let mut cache = AnalysisCache::new();

    let result = orchestrator::analyze_game(
        pgn,
        policy,
        config,
        engine.as_mut(),
        &commentary,
        &book,
        &mut cache,
    )
    .await
    .map_err(|e| e.to_string());

    if let Some(engine) = engine.as_mut() {
        engine.quit().await;
    }

    result
}
