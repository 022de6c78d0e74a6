//! PGN parsing utilities — lightweight regex-based parser.

use regex::Regex;

use crate::error::GameError;
use crate::game_data::GameMetadata;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Headers and raw movetext of a PGN, before replay.
#[derive(Debug, Clone)]
pub struct RawGame {
    pub metadata: GameMetadata,
    /// SAN tokens in game order, comments/variations stripped.
    pub san_moves: Vec<String>,
    /// Custom starting position from a `[FEN "..."]` header, if any.
    pub start_fen: Option<String>,
}

/// Parse a PGN string into headers plus SAN move tokens.
///
/// Text with neither headers nor a single move token is rejected as malformed.
pub fn parse_pgn(pgn: &str) -> Result<RawGame, GameError> {
    let header_re = Regex::new(r#"\[(\w+)\s+"([^"]*)"\]"#)
        .map_err(|e| GameError::Parse(e.to_string()))?;

    let mut white = "Unknown".to_string();
    let mut black = "Unknown".to_string();
    let mut result = "*".to_string();
    let mut date = None;
    let mut event = None;
    let mut site = None;
    let mut time_control = None;
    let mut fen = None;
    let mut saw_header = false;

    for cap in header_re.captures_iter(pgn) {
        saw_header = true;
        let key = &cap[1];
        let value = cap[2].to_string();
        match key {
            "White" => white = value,
            "Black" => black = value,
            "Result" => result = value,
            "Date" => date = Some(value),
            "Event" => event = Some(value),
            "Site" => site = Some(value),
            "TimeControl" => time_control = Some(value),
            "FEN" => fen = Some(normalize_castling(&value)),
            _ => {}
        }
    }

    let san_moves = extract_moves(pgn);

    if san_moves.is_empty() && !saw_header {
        return Err(GameError::Parse("no headers or moves found".into()));
    }

    Ok(RawGame {
        metadata: GameMetadata {
            white,
            black,
            result,
            date,
            event,
            site,
            time_control,
        },
        san_moves,
        start_fen: fen,
    })
}

/// Some sites emit castling rights in X-FEN file-letter form ("HAha");
/// the rules collaborator wants the standard "KQkq".
fn normalize_castling(fen: &str) -> String {
    if fen.contains("HAha") {
        fen.replace("HAha", "KQkq")
    } else {
        fen.to_string()
    }
}

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
fn extract_moves(pgn: &str) -> Vec<String> {
    // Remove headers
    let header_re = Regex::new(r"\[[^\]]*\]").unwrap();
    let no_headers = header_re.replace_all(pgn, "");

    // Remove comments
    let comment_re = Regex::new(r"\{[^}]*\}").unwrap();
    let no_comments = comment_re.replace_all(&no_headers, "");

    // Remove variations
    let variation_re = Regex::new(r"\([^)]*\)").unwrap();
    let no_variations = variation_re.replace_all(&no_comments, "");

    // Extract moves
    let move_re =
        Regex::new(r"[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?|O-O-O|O-O").unwrap();

    move_re
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pgn_basic() {
        let pgn = r#"[White "Player1"]
[Black "Player2"]
[Result "1-0"]
[Date "2025.01.15"]
[TimeControl "600"]

1. e4 e5 2. Nf3 Nc6 1-0"#;

        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.metadata.white, "Player1");
        assert_eq!(game.metadata.black, "Player2");
        assert_eq!(game.metadata.result, "1-0");
        assert_eq!(game.san_moves.len(), 4);
        assert_eq!(game.san_moves[0], "e4");
        assert!(game.start_fen.is_none());
    }

    #[test]
    fn test_parse_pgn_fen_header() {
        let pgn = r#"[FEN "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"]

1. e4 *"#;
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(
            game.start_fen.as_deref(),
            Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
        );
    }

    #[test]
    fn test_parse_pgn_fixes_nonstandard_castling() {
        let pgn = r#"[FEN "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w HAha - 0 1"]

1. d4 *"#;
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.start_fen.as_deref(), Some(STANDARD_START_FEN));
    }

    #[test]
    fn test_parse_pgn_strips_comments_and_variations() {
        let pgn = "1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 *";
        let game = parse_pgn(pgn).unwrap();
        assert_eq!(game.san_moves, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn test_parse_pgn_rejects_empty() {
        assert!(parse_pgn("").is_err());
        assert!(parse_pgn("no moves here").is_err());
    }
}
