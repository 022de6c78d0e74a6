//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;

use chess_core::sequencer;

use crate::error::AnalysisError;

/// Engine evaluation, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Eval {
    /// Centipawns; positive means the side to move is better.
    Cp(i32),
    /// Mate in N; negative means the side to move gets mated.
    Mate(i32),
}

impl fmt::Display for Eval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eval::Cp(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Eval::Mate(m) if *m >= 0 => write!(f, "+M{m}"),
            Eval::Mate(m) => write!(f, "-M{}", m.abs()),
        }
    }
}

/// One engine candidate line, best first in `PositionAnalysis::top_moves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateMove {
    pub uci: String,
    pub san: String,
    pub eval: Eval,
}

/// Evaluation of a single position: the main score plus ranked candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub fen: String,
    pub eval: Eval,
    pub top_moves: Vec<CandidateMove>,
}

/// Stockfish engine instance. One request is in flight at a time; callers
/// hold `&mut self` for the whole exchange, which serializes access.
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str) -> Result<Self, AnalysisError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| AnalysisError::EngineUnavailable(format!("failed to spawn {path}: {e}")))?;

        let stdin = process.stdin.take().unwrap();
        let stdout = BufReader::new(process.stdout.take().unwrap());

        let mut engine = Self {
            process,
            stdin,
            stdout,
        };

        // Initialize UCI
        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        // Configure for analysis
        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 128").await?;
        engine.send("setoption name UCI_AnalyseMode value true").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), AnalysisError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| AnalysisError::Engine(format!("failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AnalysisError::Engine(format!("failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), AnalysisError> {
        let mut line = String::new();
        loop {
            line.clear();
            self.stdout
                .read_line(&mut line)
                .await
                .map_err(|e| AnalysisError::Engine(format!("failed to read from engine: {e}")))?;
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    /// Evaluate a position to `depth` with up to `multipv` candidate lines.
    ///
    /// Scores come back relative to the side to move in `fen`.
    pub async fn analyze(
        &mut self,
        fen: &str,
        depth: u32,
        multipv: u32,
    ) -> Result<PositionAnalysis, AnalysisError> {
        self.send(&format!("setoption name MultiPV value {multipv}"))
            .await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut slots: Vec<PvSlot> = vec![PvSlot::default(); multipv as usize];
        let mut line = String::new();

        loop {
            line.clear();
            self.stdout
                .read_line(&mut line)
                .await
                .map_err(|e| AnalysisError::Engine(format!("failed to read from engine: {e}")))?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") && trimmed.contains(" pv ") {
                let idx = info_field(trimmed, "multipv").unwrap_or(1) as usize - 1;
                if idx < slots.len() {
                    slots[idx] = PvSlot {
                        cp: info_field(trimmed, "cp"),
                        mate: info_field(trimmed, "mate"),
                        pv: parse_pv(trimmed),
                    };
                }
            } else if trimmed.starts_with("bestmove") {
                break;
            }
        }

        assemble(fen, &slots)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

#[derive(Debug, Clone, Default)]
struct PvSlot {
    cp: Option<i32>,
    mate: Option<i32>,
    pv: Vec<String>,
}

impl PvSlot {
    fn eval(&self) -> Option<Eval> {
        // A mate score wins when both are present.
        self.mate.map(Eval::Mate).or(self.cp.map(Eval::Cp))
    }
}

/// Build the analysis result from filled PV slots, converting each line's
/// first move to SAN against the analyzed position.
fn assemble(fen: &str, slots: &[PvSlot]) -> Result<PositionAnalysis, AnalysisError> {
    let pos = sequencer::parse_position(fen)
        .map_err(|e| AnalysisError::Engine(format!("bad position sent to engine: {e}")))?;

    let mut top_moves = Vec::new();
    for slot in slots {
        let (Some(first), Some(eval)) = (slot.pv.first(), slot.eval()) else {
            continue;
        };
        let san = first
            .parse::<UciMove>()
            .ok()
            .and_then(|u| u.to_move(&pos).ok())
            .map(|mv| SanPlus::from_move(pos.clone(), mv).to_string())
            .unwrap_or_else(|| first.clone());
        top_moves.push(CandidateMove {
            uci: first.clone(),
            san,
            eval,
        });
    }

    let Some(best) = top_moves.first() else {
        return Err(AnalysisError::Engine("no evaluation returned".into()));
    };

    Ok(PositionAnalysis {
        fen: fen.to_string(),
        eval: best.eval,
        top_moves,
    })
}

/// Parse the integer following `key` in a UCI info line.
fn info_field(line: &str, key: &str) -> Option<i32> {
    let mut parts = line.split_whitespace();
    while let Some(part) = parts.next() {
        if part == key {
            return parts.next().and_then(|v| v.parse().ok());
        }
    }
    None
}

/// Parse PV moves from info line
fn parse_pv(line: &str) -> Vec<String> {
    let mut in_pv = false;
    let mut moves = Vec::new();

    for part in line.split_whitespace() {
        if part == "pv" {
            in_pv = true;
            continue;
        }
        if in_pv {
            // PV ends at next keyword or end of line
            if part.starts_with("bmc") || part == "string" {
                break;
            }
            moves.push(part.to_string());
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_info_field() {
        let line = "info depth 20 seldepth 25 multipv 2 score cp 35 nodes 100000 pv e2e4";
        assert_eq!(info_field(line, "cp"), Some(35));
        assert_eq!(info_field(line, "multipv"), Some(2));
        assert_eq!(info_field(line, "mate"), None);
    }

    #[test]
    fn test_parse_pv() {
        let line = "info depth 20 score cp 35 pv e2e4 e7e5 g1f3";
        assert_eq!(parse_pv(line), vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn test_assemble_ranks_candidates() {
        let slots = vec![
            PvSlot {
                cp: Some(35),
                mate: None,
                pv: vec!["e2e4".into(), "e7e5".into()],
            },
            PvSlot {
                cp: Some(30),
                mate: None,
                pv: vec!["d2d4".into()],
            },
        ];
        let analysis = assemble(START_FEN, &slots).unwrap();
        assert_eq!(analysis.eval, Eval::Cp(35));
        assert_eq!(analysis.top_moves.len(), 2);
        assert_eq!(analysis.top_moves[0].san, "e4");
        assert_eq!(analysis.top_moves[1].san, "d4");
    }

    #[test]
    fn test_assemble_prefers_mate_over_stale_cp() {
        let slots = vec![PvSlot {
            cp: Some(900),
            mate: Some(3),
            pv: vec!["e2e4".into()],
        }];
        let analysis = assemble(START_FEN, &slots).unwrap();
        assert_eq!(analysis.eval, Eval::Mate(3));
    }

    #[test]
    fn test_assemble_empty_slots_is_an_error() {
        let slots = vec![PvSlot::default()];
        assert!(assemble(START_FEN, &slots).is_err());
    }

    #[test]
    fn test_eval_display() {
        assert_eq!(Eval::Cp(35).to_string(), "+0.35");
        assert_eq!(Eval::Cp(-120).to_string(), "-1.20");
        assert_eq!(Eval::Mate(3).to_string(), "+M3");
        assert_eq!(Eval::Mate(-2).to_string(), "-M2");
    }
}
