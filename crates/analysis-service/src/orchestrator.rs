//! Full-game analysis orchestration: pick positions per the depth policy,
//! evaluate them through the cache, gather opening id and game commentary,
//! and assemble everything into a single report.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use chess_core::error::GameError;
use chess_core::game_data::{GameMetadata, LoadedGame};
use chess_core::openings::{OpeningBook, OpeningMatch};

use crate::cache::{AnalysisCache, EvalOutcome};
use crate::commentary::CommentaryClient;
use crate::config::AnalysisConfig;
use crate::stockfish::StockfishEngine;

/// Hard cap on engine calls per analysis run.
pub const MAX_ANALYZED_POSITIONS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthPolicy {
    /// Final position only.
    Minimal,
    /// Every 5th ply plus the final position.
    #[default]
    Standard,
    /// Every position.
    Deep,
}

impl FromStr for DepthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(Self::Minimal),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown depth policy: {other}")),
        }
    }
}

/// Everything one `analyze_game` call produced. Collaborator failures are
/// recorded inline; only a failed game load aborts the whole call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    pub metadata: GameMetadata,
    pub moves: Vec<String>,
    pub uci_moves: Vec<String>,
    pub positions: Vec<String>,
    pub opening: OpeningMatch,
    pub position_analyses: HashMap<String, EvalOutcome>,
    pub commentary: Result<String, String>,
}

/// Indices into the position list to evaluate, before the cap is applied.
pub fn select_positions(policy: DepthPolicy, position_count: usize) -> Vec<usize> {
    if position_count == 0 {
        return Vec::new();
    }
    let last = position_count - 1;

    match policy {
        DepthPolicy::Minimal => vec![last],
        DepthPolicy::Standard => {
            let mut indices: Vec<usize> = (0..position_count).step_by(5).collect();
            if indices.last() != Some(&last) {
                indices.push(last);
            }
            indices
        }
        DepthPolicy::Deep => (0..position_count).collect(),
    }
}

/// Reduce an over-cap selection to exactly `MAX_ANALYZED_POSITIONS` entries:
/// the first and last survive, the middle is sampled at stride
/// `floor(count / cap)`.
pub fn downsample(selected: Vec<usize>) -> Vec<usize> {
    if selected.len() <= MAX_ANALYZED_POSITIONS {
        return selected;
    }
    let stride = selected.len() / MAX_ANALYZED_POSITIONS;
    let mut kept: Vec<usize> = selected
        .iter()
        .step_by(stride)
        .take(MAX_ANALYZED_POSITIONS - 1)
        .copied()
        .collect();
    kept.push(selected[selected.len() - 1]);
    kept
}

/// Analyze a full game from PGN text.
///
/// Engine evaluations go through `cache`, so revisited positions are free.
/// The commentary call happens exactly once per invocation and is not cached.
/// A missing engine degrades to per-position "not available" outcomes.
pub async fn analyze_game(
    pgn_text: &str,
    policy: DepthPolicy,
    config: &AnalysisConfig,
    mut engine: Option<&mut StockfishEngine>,
    commentary: &CommentaryClient,
    book: &OpeningBook,
    cache: &mut AnalysisCache,
) -> Result<GameReport, GameError> {
    let game = LoadedGame::from_pgn(pgn_text)?;
    info!(move_count = game.moves.len(), ?policy, "Analyzing game");

    let opening = book.identify(&game.moves[..game.moves.len().min(10)]);

    let mut selected = select_positions(policy, game.positions.len());
    if selected.len() > MAX_ANALYZED_POSITIONS {
        debug!(
            selected = selected.len(),
            cap = MAX_ANALYZED_POSITIONS,
            "Down-sampling selection"
        );
        selected = downsample(selected);
    }

    for &idx in &selected {
        let fen = &game.positions[idx];
        if cache.get(fen).is_some() {
            debug!(ply = idx, "Cache hit");
            continue;
        }
        let outcome = match engine.as_deref_mut() {
            Some(engine) => engine
                .analyze(fen, config.search_depth, config.multipv)
                .await
                .map_err(|e| e.to_string()),
            None => Err("engine not available".to_string()),
        };
        if let Err(reason) = &outcome {
            warn!(ply = idx, reason = %reason, "Evaluation unavailable");
        }
        cache.insert(fen, outcome);
    }

    // One whole-game commentary call per analysis run, never cached.
    let commentary_text = commentary
        .game_commentary(pgn_text)
        .await
        .map_err(|e| e.to_string());

    let mut position_analyses = HashMap::new();
    for &idx in &selected {
        let fen = &game.positions[idx];
        if let Some(outcome) = cache.get(fen) {
            position_analyses.insert(fen.clone(), outcome.clone());
        }
    }

    Ok(GameReport {
        metadata: game.metadata,
        moves: game.moves,
        uci_moves: game.uci_moves,
        positions: game.positions,
        opening,
        position_analyses,
        commentary: commentary_text,
    })
}
