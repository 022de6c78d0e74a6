//! Per-user viewer session state.
//!
//! The loaded game, its position list, the cursor, and the evaluation cache
//! are owned together: loading a new game replaces all of them atomically,
//! and a generation counter lets late results from a previous game be
//! recognized and discarded.

use chrono::Local;
use shakmaty::{Chess, Color, Position, Role, Square};

use analysis_service::cache::AnalysisCache;
use analysis_service::commentary::CommentaryClient;
use analysis_service::config::AnalysisConfig;
use analysis_service::orchestrator::{DepthPolicy, GameReport};
use chess_core::cursor::Cursor;
use chess_core::error::GameError;
use chess_core::game_data::{GameMetadata, LoadedGame};
use chess_core::pgn::STANDARD_START_FEN;
use chess_core::sequencer;

use crate::background::PendingAnalysis;
use crate::debug_log::DebugLog;

pub struct Session {
    pub(crate) config: AnalysisConfig,
    pub(crate) game: Option<LoadedGame>,
    /// Bumped on every game replacement; tags in-flight analysis requests.
    pub(crate) generation: u64,
    pub(crate) cursor: Cursor,
    pub(crate) cache: AnalysisCache,
    pub(crate) report: Option<GameReport>,
    pub(crate) analysis_error: Option<String>,
    pub(crate) analysis_in_progress: bool,
    pub(crate) pending: Option<PendingAnalysis>,
    pub(crate) selected_square: Option<Square>,
    pub(crate) flip_board: bool,
    pub(crate) show_arrows: bool,
    pub(crate) show_heatmap: bool,
    pub(crate) show_influence: bool,
    pub(crate) depth_policy: DepthPolicy,
    pub(crate) debug: DebugLog,
}

impl Session {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            game: None,
            generation: 0,
            cursor: Cursor::new(0),
            cache: AnalysisCache::new(),
            report: None,
            analysis_error: None,
            analysis_in_progress: false,
            pending: None,
            selected_square: None,
            flip_board: false,
            show_arrows: true,
            show_heatmap: false,
            show_influence: false,
            depth_policy: DepthPolicy::default(),
            debug: DebugLog::new(),
        }
    }

    pub fn game(&self) -> Option<&LoadedGame> {
        self.game.as_ref()
    }

    pub fn cursor_index(&self) -> isize {
        self.cursor.index()
    }

    pub fn report(&self) -> Option<&GameReport> {
        self.report.as_ref()
    }

    pub fn analysis_in_progress(&self) -> bool {
        self.analysis_in_progress
    }

    pub fn cache(&self) -> &AnalysisCache {
        &self.cache
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.selected_square
    }

    pub fn debug_entries(&self) -> &[String] {
        self.debug.entries()
    }

    /// FEN of the board the user currently sees: `positions[cursor + 1]`,
    /// or the standard starting position when nothing is loaded.
    pub fn current_fen(&self) -> String {
        match &self.game {
            Some(game) => game.positions[self.cursor.position_index()].clone(),
            None => STANDARD_START_FEN.to_string(),
        }
    }

    /// Load a game from PGN text. On failure the existing session state is
    /// left untouched.
    pub fn load_pgn(&mut self, pgn_text: &str) -> Result<(), GameError> {
        let game = LoadedGame::from_pgn(pgn_text)?;
        self.debug
            .add(format!("Loaded game with {} moves", game.moves.len()));
        self.cache.clear();
        self.install_game(game);
        Ok(())
    }

    /// Swap in a new game value, discarding everything tied to the old one.
    fn install_game(&mut self, game: LoadedGame) {
        self.cursor = Cursor::new(game.moves.len());
        self.report = None;
        self.analysis_error = None;
        self.analysis_in_progress = false;
        self.pending = None;
        self.selected_square = None;
        self.generation += 1;
        self.game = Some(game);
    }

    /// Drop the loaded game and all derived state. View flags survive.
    pub fn reset(&mut self) {
        self.game = None;
        self.cursor = Cursor::new(0);
        self.cache.clear();
        self.report = None;
        self.analysis_error = None;
        self.analysis_in_progress = false;
        self.pending = None;
        self.selected_square = None;
        self.generation += 1;
        self.debug.clear();
        self.debug.add("Session reset");
    }

    fn clear_selection(&mut self) {
        self.selected_square = None;
    }

    pub fn go_start(&mut self) {
        self.cursor.start();
        self.clear_selection();
    }

    pub fn go_prev(&mut self) {
        self.cursor.prev();
        self.clear_selection();
    }

    pub fn go_next(&mut self) {
        self.cursor.next();
        self.clear_selection();
    }

    pub fn go_end(&mut self) {
        self.cursor.end();
        self.clear_selection();
    }

    pub fn jump_to(&mut self, index: isize) -> Result<(), GameError> {
        self.cursor.jump_to(index)?;
        self.clear_selection();
        Ok(())
    }

    /// Enter a move (UCI or SAN) against the displayed position. Forward
    /// history is discarded and the game value rebuilt and replaced wholesale,
    /// so the position-list invariant keeps holding. The evaluation cache is
    /// retained: its keys are canonical positions, still valid on revisit.
    pub fn make_move(&mut self, input: &str) -> Result<(), GameError> {
        let fen = self.current_fen();
        let resolved = sequencer::resolve_move(&fen, input)?;

        let (metadata, start_fen, mut moves) = match &self.game {
            Some(game) => (
                game.metadata.clone(),
                game.start_fen.clone(),
                game.moves[..self.cursor.position_index()].to_vec(),
            ),
            None => (
                GameMetadata {
                    white: "Player".to_string(),
                    black: "Opponent".to_string(),
                    result: "*".to_string(),
                    ..Default::default()
                },
                fen.clone(),
                Vec::new(),
            ),
        };
        moves.push(resolved.san.clone());

        let replay = sequencer::sequence(Some(&start_fen), &moves)?;
        let mut game = LoadedGame {
            metadata,
            start_fen: replay.positions[0].clone(),
            moves: replay.notations,
            uci_moves: replay.uci_moves,
            positions: replay.positions,
            pgn: String::new(),
        };
        game.pgn = generate_pgn(&game);

        self.debug.add(format!("Played {}", resolved.san));
        self.install_game(game);
        self.cursor.end();
        Ok(())
    }

    /// Handle a click on a board square: first click selects a piece of the
    /// side to move, second click attempts the move. A pawn landing on the
    /// last rank with no promotion piece given becomes a queen.
    pub fn square_click(&mut self, square: Square) -> Result<(), GameError> {
        let fen = self.current_fen();
        let pos = sequencer::parse_position(&fen)?;

        if let Some(from) = self.selected_square {
            let mut uci = format!("{from}{square}");
            if is_pawn_promotion(&pos, from, square) {
                uci.push('q');
            }
            if self.make_move(&uci).is_ok() {
                return Ok(());
            }
            // Not a legal move; treat the click as a new selection attempt.
        }

        self.selected_square = match pos.board().piece_at(square) {
            Some(piece) if piece.color == pos.turn() => Some(square),
            _ => None,
        };
        Ok(())
    }

    /// On-demand free-text commentary for the displayed position; not cached.
    pub async fn explain_position(&mut self, client: &CommentaryClient) -> Result<String, String> {
        let fen = self.current_fen();
        let result = client
            .position_commentary(&fen)
            .await
            .map_err(|e| e.to_string());
        match &result {
            Ok(_) => self.debug.add("Position commentary received"),
            Err(e) => self
                .debug
                .add(format!("Position commentary unavailable: {e}")),
        }
        result
    }

    /// Serialize the current game back to PGN text.
    pub fn to_pgn(&self) -> Option<String> {
        self.game.as_ref().map(generate_pgn)
    }
}

fn is_pawn_promotion(pos: &Chess, from: Square, to: Square) -> bool {
    pos.board()
        .piece_at(from)
        .map_or(false, |piece| piece.role == Role::Pawn)
        && matches!(to.rank(), shakmaty::Rank::First | shakmaty::Rank::Eighth)
}

/// Serialize a game to PGN, deriving the result from the final position when
/// the game actually ended there.
pub fn generate_pgn(game: &LoadedGame) -> String {
    let mut out = String::new();

    let event = game.metadata.event.as_deref().unwrap_or("Chess Analysis");
    let date = game
        .metadata
        .date
        .clone()
        .unwrap_or_else(|| Local::now().format("%Y.%m.%d").to_string());
    let white = if game.metadata.white.is_empty() {
        "Player"
    } else {
        &game.metadata.white
    };
    let black = if game.metadata.black.is_empty() {
        "Opponent"
    } else {
        &game.metadata.black
    };
    let result = final_result(game);

    out.push_str(&format!("[Event \"{event}\"]\n"));
    out.push_str(&format!("[Date \"{date}\"]\n"));
    out.push_str(&format!("[White \"{white}\"]\n"));
    out.push_str(&format!("[Black \"{black}\"]\n"));
    out.push_str(&format!("[Result \"{result}\"]\n"));
    if game.start_fen != STANDARD_START_FEN {
        out.push_str("[SetUp \"1\"]\n");
        out.push_str(&format!("[FEN \"{}\"]\n", game.start_fen));
    }
    out.push('\n');

    for (i, san) in game.moves.iter().enumerate() {
        if i % 2 == 0 {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{}. {san}", i / 2 + 1));
        } else {
            out.push_str(&format!(" {san}"));
        }
    }
    if !game.moves.is_empty() {
        out.push(' ');
    }
    out.push_str(&result);
    out.push('\n');

    out
}

fn final_result(game: &LoadedGame) -> String {
    if let Ok(pos) = sequencer::parse_position(game.final_position()) {
        if pos.is_checkmate() {
            // The side to move in the final position is the one that got mated.
            return match pos.turn() {
                Color::White => "0-1".to_string(),
                Color::Black => "1-0".to_string(),
            };
        }
        if pos.is_stalemate() || pos.is_insufficient_material() {
            return "1/2-1/2".to_string();
        }
    }
    if game.metadata.result.is_empty() {
        "*".to_string()
    } else {
        game.metadata.result.clone()
    }
}
