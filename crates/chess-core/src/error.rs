//! Core error types for game loading and replay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid PGN: {0}")]
    Parse(String),

    #[error("Illegal move {notation} at ply {ply}")]
    IllegalMove { notation: String, ply: usize },

    #[error("Move index {index} out of range [-1, {max}]")]
    IndexOutOfRange { index: isize, max: isize },
}
