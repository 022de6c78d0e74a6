pub mod cursor;
pub mod error;
pub mod game_data;
pub mod openings;
pub mod pgn;
pub mod sequencer;

pub use cursor::Cursor;
pub use error::GameError;
pub use game_data::{GameMetadata, LoadedGame};
pub use openings::{OpeningBook, OpeningMatch};
