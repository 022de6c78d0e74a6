//! View-model derivation: a pure function of session state.
//!
//! The rendering collaborator re-renders on every interaction; it consumes
//! this serializable snapshot and nothing else. Derivation never calls a
//! collaborator, so repeated derivation of the same state is free and
//! identical.

use serde::Serialize;
use shakmaty::Color;

use analysis_service::stockfish::Eval;

use crate::maps::{self, ControlGrid, InfluenceGrid};
use crate::overlay;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct ArrowView {
    pub from: String,
    pub to: String,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub board_fen: String,
    pub flip_board: bool,
    /// Numbered move list, e.g. `"1. e4"`, `"1... e5"`.
    pub move_list: Vec<String>,
    /// `"Move 2/4"` style cursor readout.
    pub move_counter: String,
    /// Label for the move the cursor sits on, e.g. `"1... e5 (Black)"`.
    pub current_move: Option<String>,
    /// White-relative evaluation text for the displayed position.
    pub evaluation: Option<String>,
    /// Ranked candidate lines, e.g. `"1. Nf3 (+0.35)"`.
    pub top_moves: Vec<String>,
    pub arrows: Vec<ArrowView>,
    pub opening: Option<String>,
    pub commentary: Option<String>,
    pub analysis_error: Option<String>,
    pub analysis_in_progress: bool,
    pub white_control: Option<ControlGrid>,
    pub black_control: Option<ControlGrid>,
    pub influence: Option<InfluenceGrid>,
    pub debug: Vec<String>,
}

impl ViewModel {
    pub fn derive(session: &Session) -> Self {
        let board_fen = session.current_fen();
        let white_to_move = side_to_move(&board_fen) == Color::White;

        let (move_list, move_counter, current_move) = match session.game() {
            Some(game) => {
                let list = game
                    .moves
                    .iter()
                    .enumerate()
                    .map(|(i, san)| move_label(i, san))
                    .collect();
                let counter = format!(
                    "Move {}/{}",
                    session.cursor_index() + 1,
                    game.moves.len()
                );
                let current = usize::try_from(session.cursor_index())
                    .ok()
                    .and_then(|i| game.moves.get(i).map(|san| current_move_label(i, san)));
                (list, counter, current)
            }
            None => (Vec::new(), "Move 0/0".to_string(), None),
        };

        let cached = session.cache().get(&board_fen);
        let evaluation = cached
            .and_then(|outcome| outcome.as_ref().ok())
            .map(|analysis| eval_text(analysis.eval, white_to_move));
        let top_moves = cached
            .and_then(|outcome| outcome.as_ref().ok())
            .map(|analysis| {
                analysis
                    .top_moves
                    .iter()
                    .enumerate()
                    .map(|(i, c)| format!("{}. {} ({})", i + 1, c.san, c.eval))
                    .collect()
            })
            .unwrap_or_default();
        let arrows = if session.show_arrows {
            cached
                .map(|outcome| {
                    overlay::arrows_from_outcome(outcome)
                        .into_iter()
                        .map(|a| ArrowView {
                            from: a.from.to_string(),
                            to: a.to.to_string(),
                            rank: a.rank,
                        })
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let opening = session.report().map(|report| {
            if report.opening.eco.is_empty() {
                report.opening.name.clone()
            } else {
                format!("{} ({})", report.opening.name, report.opening.eco)
            }
        });
        let commentary = session
            .report()
            .and_then(|report| report.commentary.as_ref().ok().cloned());

        let white_control = session
            .show_heatmap
            .then(|| maps::control_heatmap(&board_fen, Color::White).ok())
            .flatten();
        let black_control = session
            .show_heatmap
            .then(|| maps::control_heatmap(&board_fen, Color::Black).ok())
            .flatten();
        let influence = session
            .show_influence
            .then(|| maps::influence_map(&board_fen).ok())
            .flatten();

        Self {
            board_fen,
            flip_board: session.flip_board,
            move_list,
            move_counter,
            current_move,
            evaluation,
            top_moves,
            arrows,
            opening,
            commentary,
            analysis_error: session.analysis_error.clone(),
            analysis_in_progress: session.analysis_in_progress(),
            white_control,
            black_control,
            influence,
            debug: session.debug_entries().to_vec(),
        }
    }
}

fn side_to_move(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}

fn move_label(index: usize, san: &str) -> String {
    let number = index / 2 + 1;
    if index % 2 == 0 {
        format!("{number}. {san}")
    } else {
        format!("{number}... {san}")
    }
}

fn current_move_label(index: usize, san: &str) -> String {
    let number = index / 2 + 1;
    if index % 2 == 0 {
        format!("{number}. {san} (White)")
    } else {
        format!("{number}... {san} (Black)")
    }
}

/// Scores arrive relative to the side to move; flip to a White-relative
/// reading for display.
fn eval_text(eval: Eval, white_to_move: bool) -> String {
    let white_relative = if white_to_move { eval } else { negate(eval) };
    match white_relative {
        Eval::Cp(cp) => {
            let side = if cp >= 0 { "White" } else { "Black" };
            format!(
                "{:.2} pawns advantage for {side}",
                (cp as f64 / 100.0).abs()
            )
        }
        Eval::Mate(mate) => {
            let side = if mate > 0 { "White" } else { "Black" };
            format!("Mate in {} for {side}", mate.abs())
        }
    }
}

fn negate(eval: Eval) -> Eval {
    match eval {
        Eval::Cp(cp) => Eval::Cp(-cp),
        Eval::Mate(mate) => Eval::Mate(-mate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_service::config::AnalysisConfig;

    fn session() -> Session {
        Session::new(AnalysisConfig {
            stockfish_path: "stockfish".into(),
            search_depth: 8,
            multipv: 3,
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".into(),
        })
    }

    #[test]
    fn test_move_labels() {
        assert_eq!(move_label(0, "e4"), "1. e4");
        assert_eq!(move_label(1, "e5"), "1... e5");
        assert_eq!(move_label(4, "Bb5"), "3. Bb5");
        assert_eq!(current_move_label(1, "e5"), "1... e5 (Black)");
    }

    #[test]
    fn test_eval_text_is_white_relative() {
        // +0.50 for the side to move, Black to move: White is worse.
        assert_eq!(
            eval_text(Eval::Cp(50), false),
            "0.50 pawns advantage for Black"
        );
        assert_eq!(
            eval_text(Eval::Cp(50), true),
            "0.50 pawns advantage for White"
        );
        assert_eq!(eval_text(Eval::Mate(-2), false), "Mate in 2 for White");
    }

    #[test]
    fn test_derive_tracks_cursor() {
        let mut s = session();
        s.dispatch(crate::events::Event::LoadPgn(
            "1. e4 e5 2. Nf3 Nc6 *".to_string(),
        ))
        .unwrap();
        s.dispatch(crate::events::Event::GoNext).unwrap();
        s.dispatch(crate::events::Event::GoNext).unwrap();

        let view = ViewModel::derive(&s);
        assert_eq!(view.move_counter, "Move 2/4");
        assert_eq!(view.current_move.as_deref(), Some("1... e5 (Black)"));
        assert_eq!(view.move_list.len(), 4);
        assert!(view.evaluation.is_none());
        // Deriving twice from the same state gives the same answer.
        let again = ViewModel::derive(&s);
        assert_eq!(view.board_fen, again.board_fen);
        assert_eq!(view.move_counter, again.move_counter);
    }

    #[test]
    fn test_derive_serializes() {
        let mut s = session();
        s.dispatch(crate::events::Event::SetShowHeatmap(true)).unwrap();
        let view = ViewModel::derive(&s);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json["white_control"].is_array());
        assert_eq!(json["flip_board"], false);
    }
}
