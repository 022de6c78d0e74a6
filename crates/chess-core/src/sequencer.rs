//! Position sequencing: replay a move list into FEN snapshots.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position};

use crate::error::GameError;

/// Output of a full replay: `positions.len() == notations.len() + 1`.
#[derive(Debug, Clone)]
pub struct Replay {
    pub positions: Vec<String>,
    pub notations: Vec<String>,
    pub uci_moves: Vec<String>,
}

/// A single move resolved against a concrete position.
#[derive(Debug, Clone)]
pub struct ResolvedMove {
    pub san: String,
    pub uci: String,
    pub fen_after: String,
}

pub fn parse_position(fen: &str) -> Result<Chess, GameError> {
    let parsed: Fen = fen
        .parse()
        .map_err(|e| GameError::Parse(format!("invalid FEN {fen}: {e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| GameError::Parse(format!("illegal position {fen}: {e}")))
}

pub fn position_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Replay `san_moves` from `start_fen` (standard start when `None`).
///
/// The notation for each ply is derived against the pre-move position
/// (disambiguation depends on it), then the move is applied. The first
/// illegal move aborts the whole replay.
pub fn sequence(start_fen: Option<&str>, san_moves: &[String]) -> Result<Replay, GameError> {
    let mut pos = match start_fen {
        Some(fen) => parse_position(fen)?,
        None => Chess::default(),
    };

    let mut positions = Vec::with_capacity(san_moves.len() + 1);
    let mut notations = Vec::with_capacity(san_moves.len());
    let mut uci_moves = Vec::with_capacity(san_moves.len());

    positions.push(position_fen(&pos));

    for (ply, san_str) in san_moves.iter().enumerate() {
        let san: SanPlus = san_str.parse().map_err(|_| GameError::IllegalMove {
            notation: san_str.clone(),
            ply,
        })?;
        let mv = san.san.to_move(&pos).map_err(|_| GameError::IllegalMove {
            notation: san_str.clone(),
            ply,
        })?;

        // Notation is context-dependent (disambiguation, check suffix), so
        // derive it against the pre-move position.
        notations.push(SanPlus::from_move(pos.clone(), mv).to_string());
        uci_moves.push(mv.to_uci(CastlingMode::Standard).to_string());

        pos.play_unchecked(mv);
        positions.push(position_fen(&pos));
    }

    Ok(Replay {
        positions,
        notations,
        uci_moves,
    })
}

/// Resolve a move given in either coordinate (UCI) or SAN form against `fen`.
pub fn resolve_move(fen: &str, input: &str) -> Result<ResolvedMove, GameError> {
    let pos = parse_position(fen)?;

    let mv = match input.parse::<UciMove>().ok().and_then(|u| u.to_move(&pos).ok()) {
        Some(mv) => mv,
        None => {
            let san: SanPlus = input.parse().map_err(|_| GameError::IllegalMove {
                notation: input.to_string(),
                ply: 0,
            })?;
            san.san.to_move(&pos).map_err(|_| GameError::IllegalMove {
                notation: input.to_string(),
                ply: 0,
            })?
        }
    };

    let san = SanPlus::from_move(pos.clone(), mv).to_string();
    let uci = mv.to_uci(CastlingMode::Standard).to_string();
    let mut after = pos;
    after.play_unchecked(mv);

    Ok(ResolvedMove {
        san,
        uci,
        fen_after: position_fen(&after),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_length_invariant() {
        let moves: Vec<String> = ["e4", "e5", "Nf3", "Nc6"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let replay = sequence(None, &moves).unwrap();
        assert_eq!(replay.positions.len(), 5);
        assert_eq!(replay.notations, moves);
        assert_eq!(replay.uci_moves, vec!["e2e4", "e7e5", "g1f3", "b8c6"]);
    }

    #[test]
    fn test_sequence_chains_positions() {
        let moves: Vec<String> = ["e4", "e5"].iter().map(|s| s.to_string()).collect();
        let replay = sequence(None, &moves).unwrap();
        // Each snapshot must be reachable by applying the move to its predecessor.
        for i in 0..moves.len() {
            let resolved = resolve_move(&replay.positions[i], &moves[i]).unwrap();
            assert_eq!(resolved.fen_after, replay.positions[i + 1]);
        }
    }

    #[test]
    fn test_sequence_fails_fast_on_illegal_move() {
        let moves: Vec<String> = ["e4", "e4"].iter().map(|s| s.to_string()).collect();
        let err = sequence(None, &moves).unwrap_err();
        match err {
            GameError::IllegalMove { notation, ply } => {
                assert_eq!(notation, "e4");
                assert_eq!(ply, 1);
            }
            other => panic!("expected IllegalMove, got {other}"),
        }
    }

    #[test]
    fn test_resolve_move_accepts_uci_and_san() {
        let start = position_fen(&Chess::default());
        let from_uci = resolve_move(&start, "e2e4").unwrap();
        let from_san = resolve_move(&start, "e4").unwrap();
        assert_eq!(from_uci.fen_after, from_san.fen_after);
        assert_eq!(from_uci.san, "e4");
        assert_eq!(from_san.uci, "e2e4");
    }

    #[test]
    fn test_resolve_move_rejects_illegal() {
        let start = position_fen(&Chess::default());
        assert!(resolve_move(&start, "e2e5").is_err());
        assert!(resolve_move(&start, "Qh5").is_err());
    }
}
