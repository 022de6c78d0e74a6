//! Opening identification against a small fixed table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningMatch {
    pub name: String,
    pub eco: String,
}

impl OpeningMatch {
    pub fn unknown() -> Self {
        Self {
            name: "Unknown Opening".to_string(),
            eco: String::new(),
        }
    }
}

struct OpeningEntry {
    moves: &'static [&'static str],
    name: &'static str,
    eco: &'static str,
}

/// SAN-prefix keyed opening table. Longest matching prefix wins.
pub struct OpeningBook {
    entries: Vec<OpeningEntry>,
}

impl Default for OpeningBook {
    fn default() -> Self {
        Self {
            entries: vec![
                OpeningEntry {
                    moves: &["e4", "e5", "Nf3"],
                    name: "King's Pawn Game",
                    eco: "C40",
                },
                OpeningEntry {
                    moves: &["e4", "e5", "Nf3", "Nc6", "Bb5"],
                    name: "Ruy Lopez",
                    eco: "C60",
                },
                OpeningEntry {
                    moves: &["e4", "c5"],
                    name: "Sicilian Defense",
                    eco: "B20",
                },
                OpeningEntry {
                    moves: &["d4", "d5"],
                    name: "Queen's Pawn Game",
                    eco: "D00",
                },
                OpeningEntry {
                    moves: &["d4", "Nf6", "c4", "g6"],
                    name: "King's Indian Defense",
                    eco: "E60",
                },
            ],
        }
    }
}

impl OpeningBook {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Match the game's opening by longest move-prefix; unknown when nothing
    /// in the table is a prefix of `moves`.
    pub fn identify(&self, moves: &[String]) -> OpeningMatch {
        let mut best: Option<&OpeningEntry> = None;

        for entry in &self.entries {
            if entry.moves.len() > moves.len() {
                continue;
            }
            let is_prefix = entry
                .moves
                .iter()
                .zip(moves.iter())
                .all(|(want, got)| *want == got);
            if is_prefix && best.map_or(true, |b| entry.moves.len() > b.moves.len()) {
                best = Some(entry);
            }
        }

        match best {
            Some(entry) => OpeningMatch {
                name: entry.name.to_string(),
                eco: entry.eco.to_string(),
            },
            None => OpeningMatch::unknown(),
        }
    }
}
