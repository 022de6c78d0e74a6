use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::pgn;
use crate::sequencer;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetadata {
    pub white: String,
    pub black: String,
    pub result: String, // "1-0", "0-1", "1/2-1/2", "*"
    pub date: Option<String>,
    pub event: Option<String>,
    pub site: Option<String>,
    pub time_control: Option<String>,
}

/// A fully replayed game: the move text plus every intermediate position.
///
/// Invariant: `positions.len() == moves.len() + 1`, `positions[0]` is the
/// starting position and `positions[i + 1]` is the position after `moves[i]`.
/// The value is immutable once built; editing a game means building a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedGame {
    pub metadata: GameMetadata,
    /// FEN of the starting position (custom when the PGN carried a FEN header).
    pub start_fen: String,
    /// SAN notations, one per half-move.
    pub moves: Vec<String>,
    /// The same half-moves in coordinate (UCI) notation.
    pub uci_moves: Vec<String>,
    /// FEN snapshots, one more entry than `moves`.
    pub positions: Vec<String>,
    pub pgn: String,
}

impl LoadedGame {
    /// Parse PGN text and replay every move.
    ///
    /// Fails on malformed PGN and on the first illegal move; a partially
    /// replayed game is never returned.
    pub fn from_pgn(pgn_text: &str) -> Result<Self, GameError> {
        let raw = pgn::parse_pgn(pgn_text)?;
        let replay = sequencer::sequence(raw.start_fen.as_deref(), &raw.san_moves)?;

        Ok(Self {
            metadata: raw.metadata,
            start_fen: replay.positions[0].clone(),
            moves: replay.notations,
            uci_moves: replay.uci_moves,
            positions: replay.positions,
            pgn: pgn_text.to_string(),
        })
    }

    /// FEN of the final position.
    pub fn final_position(&self) -> &str {
        self.positions
            .last()
            .map(|s| s.as_str())
            .unwrap_or(&self.start_fen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pgn_positions_invariant() {
        let game = LoadedGame::from_pgn("1. e4 e5 2. Nf3 Nc6 *").unwrap();
        assert_eq!(game.moves.len(), 4);
        assert_eq!(game.positions.len(), 5);
        assert_eq!(game.start_fen, game.positions[0]);
    }

    #[test]
    fn test_from_pgn_rejects_garbage() {
        assert!(LoadedGame::from_pgn("not a chess game at all").is_err());
    }
}
