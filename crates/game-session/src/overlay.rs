//! Suggested-move overlay: arrows derived from engine candidate lines.

use shakmaty::uci::UciMove;
use shakmaty::Square;

use analysis_service::cache::EvalOutcome;
use analysis_service::stockfish::StockfishEngine;

use crate::session::Session;

/// One arrow for the board overlay; `rank` 0 is the engine's best line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrow {
    pub from: Square,
    pub to: Square,
    pub rank: usize,
}

/// Convert a cached outcome into arrows, best line first. A failed or
/// unavailable evaluation yields no arrows rather than an error.
pub fn arrows_from_outcome(outcome: &EvalOutcome) -> Vec<Arrow> {
    let Ok(analysis) = outcome else {
        return Vec::new();
    };
    analysis
        .top_moves
        .iter()
        .enumerate()
        .filter_map(|(rank, candidate)| arrow_for_uci(&candidate.uci, rank))
        .collect()
}

fn arrow_for_uci(uci: &str, rank: usize) -> Option<Arrow> {
    match uci.parse::<UciMove>().ok()? {
        UciMove::Normal { from, to, .. } => Some(Arrow { from, to, rank }),
        _ => None,
    }
}

impl Session {
    /// Evaluation of the displayed position, from the cache when present,
    /// freshly computed (and cached, errors included) otherwise.
    pub async fn ensure_current_analysis(
        &mut self,
        engine: Option<&mut StockfishEngine>,
    ) -> EvalOutcome {
        let fen = self.current_fen();
        if let Some(outcome) = self.cache.get(&fen) {
            self.debug.add("Using cached analysis for current position");
            return outcome.clone();
        }

        let outcome = match engine {
            Some(engine) => engine
                .analyze(&fen, self.config.search_depth, self.config.multipv)
                .await
                .map_err(|e| e.to_string()),
            None => Err("engine not available".to_string()),
        };
        self.cache.insert(&fen, outcome.clone());
        outcome
    }

    /// Arrows for the displayed position. Empty when arrows are toggled off
    /// or no evaluation is obtainable.
    pub async fn suggested_arrows(&mut self, engine: Option<&mut StockfishEngine>) -> Vec<Arrow> {
        if !self.show_arrows {
            return Vec::new();
        }
        let outcome = self.ensure_current_analysis(engine).await;
        arrows_from_outcome(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_service::stockfish::{CandidateMove, Eval, PositionAnalysis};

    #[test]
    fn test_arrows_follow_engine_ranking() {
        let outcome: EvalOutcome = Ok(PositionAnalysis {
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".into(),
            eval: Eval::Cp(30),
            top_moves: vec![
                CandidateMove {
                    uci: "e2e4".into(),
                    san: "e4".into(),
                    eval: Eval::Cp(30),
                },
                CandidateMove {
                    uci: "d2d4".into(),
                    san: "d4".into(),
                    eval: Eval::Cp(25),
                },
            ],
        });

        let arrows = arrows_from_outcome(&outcome);
        assert_eq!(arrows.len(), 2);
        assert_eq!(arrows[0].from, Square::E2);
        assert_eq!(arrows[0].to, Square::E4);
        assert_eq!(arrows[0].rank, 0);
        assert_eq!(arrows[1].from, Square::D2);
        assert_eq!(arrows[1].rank, 1);
    }

    #[test]
    fn test_failed_outcome_yields_no_arrows() {
        let outcome: EvalOutcome = Err("engine not available".into());
        assert!(arrows_from_outcome(&outcome).is_empty());
    }
}
