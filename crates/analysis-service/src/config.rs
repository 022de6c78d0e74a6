//! Analysis configuration from environment variables

use std::env;

#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search depth per evaluated position
    pub search_depth: u32,

    /// Candidate lines requested per evaluation
    pub multipv: u32,

    /// Groq API key; commentary is unavailable without one
    pub groq_api_key: Option<String>,

    /// Groq model identifier
    pub groq_model: String,
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Self {
        let stockfish_path =
            env::var("STOCKFISH_PATH").unwrap_or_else(|_| "stockfish".to_string());

        let search_depth = env::var("SEARCH_DEPTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(18);

        let multipv = env::var("MULTIPV")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let groq_api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());

        let groq_model =
            env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        Self {
            stockfish_path,
            search_depth,
            multipv,
            groq_api_key,
            groq_model,
        }
    }
}
