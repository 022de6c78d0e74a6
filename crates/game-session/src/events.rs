//! Session events: one value per user interaction, one dispatch entry point.
//!
//! The UI collaborator re-renders after every interaction; mapping each
//! interaction to an explicit event keeps the mutation step deterministic,
//! so replaying the same event list reproduces the same session state.

use shakmaty::Square;

use analysis_service::orchestrator::DepthPolicy;
use chess_core::error::GameError;

use crate::session::Session;

#[derive(Debug, Clone)]
pub enum Event {
    LoadPgn(String),
    Reset,
    GoStart,
    GoPrev,
    GoNext,
    GoEnd,
    JumpTo(isize),
    MakeMove(String),
    SquareClick(Square),
    SetFlipBoard(bool),
    SetShowArrows(bool),
    SetShowHeatmap(bool),
    SetShowInfluence(bool),
    SetDepthPolicy(DepthPolicy),
    StartAnalysis,
    PollAnalysis,
}

impl Session {
    /// Apply one event to the session. Collaborator-backed events
    /// (`StartAnalysis`) only spawn work; their results arrive through
    /// `PollAnalysis`. A failed event leaves the session state valid.
    pub fn dispatch(&mut self, event: Event) -> Result<(), GameError> {
        match event {
            Event::LoadPgn(text) => self.load_pgn(&text)?,
            Event::Reset => self.reset(),
            Event::GoStart => self.go_start(),
            Event::GoPrev => self.go_prev(),
            Event::GoNext => self.go_next(),
            Event::GoEnd => self.go_end(),
            Event::JumpTo(index) => self.jump_to(index)?,
            Event::MakeMove(input) => self.make_move(&input)?,
            Event::SquareClick(square) => self.square_click(square)?,
            Event::SetFlipBoard(value) => self.flip_board = value,
            Event::SetShowArrows(value) => self.show_arrows = value,
            Event::SetShowHeatmap(value) => self.show_heatmap = value,
            Event::SetShowInfluence(value) => self.show_influence = value,
            Event::SetDepthPolicy(policy) => self.depth_policy = policy,
            Event::StartAnalysis => self.start_analysis(),
            Event::PollAnalysis => self.poll_analysis(),
        }
        Ok(())
    }
}
