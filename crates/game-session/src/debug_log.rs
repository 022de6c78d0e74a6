//! Session-scoped diagnostic log.
//!
//! Append-only, timestamped, cleared only on explicit session reset. Every
//! entry is mirrored to `tracing` at debug level.

use chrono::Local;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DebugLog {
    entries: Vec<String>,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{message}");
        self.entries.push(format!(
            "{} - {}",
            Local::now().format("%H:%M:%S%.3f"),
            message
        ));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_appended_in_order() {
        let mut log = DebugLog::new();
        log.add("first");
        log.add("second");
        assert_eq!(log.len(), 2);
        assert!(log.entries()[0].ends_with(" - first"));
        assert!(log.entries()[1].ends_with(" - second"));
    }

    #[test]
    fn test_clear() {
        let mut log = DebugLog::new();
        log.add("something");
        log.clear();
        assert!(log.is_empty());
    }
}
