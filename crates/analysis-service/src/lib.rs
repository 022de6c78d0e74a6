pub mod cache;
pub mod commentary;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod stockfish;

pub use cache::{AnalysisCache, EvalOutcome};
pub use commentary::CommentaryClient;
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use orchestrator::{analyze_game, DepthPolicy, GameReport, MAX_ANALYZED_POSITIONS};
pub use stockfish::{CandidateMove, Eval, PositionAnalysis, StockfishEngine};
