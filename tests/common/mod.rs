use analysis_service::config::AnalysisConfig;
use game_session::Session;

pub const SCHOLAR_OPENING_PGN: &str = "1. e4 e5 2. Nf3 Nc6 *";

/// Italian game long enough to exercise the standard depth policy.
pub const ITALIAN_PGN: &str = "\
[White \"Player1\"]
[Black \"Player2\"]
[Result \"*\"]

1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. c3 Nf6 5. d3 d6 6. O-O a6 *";

/// Config pointing at nothing: no engine on PATH is fine for these tests
/// and no API key keeps the commentary client offline.
pub fn offline_config() -> AnalysisConfig {
    AnalysisConfig {
        stockfish_path: "/nonexistent/stockfish".to_string(),
        search_depth: 5,
        multipv: 3,
        groq_api_key: None,
        groq_model: "llama-3.3-70b-versatile".to_string(),
    }
}

/// Build a session against offline collaborators.
pub fn session() -> Session {
    Session::new(offline_config())
}
