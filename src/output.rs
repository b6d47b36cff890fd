//! Operator-facing output.
//!
//! Core functions never print directly; they receive an `OutputSink`.

#[cfg(test)]
use std::sync::Mutex;

/// Where progress, warnings and failures for the operator go.
pub trait OutputSink: Send + Sync {
    fn say(&self, message: &str);
    fn warn(&self, message: &str);
    fn fail(&self, message: &str);
}

/// Prints to the terminal: `say` on stdout, `warn`/`fail` on stderr.
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn say(&self, message: &str) {
        println!("{}", message);
    }

    fn warn(&self, message: &str) {
        eprintln!("⚠️  {}", message);
    }

    fn fail(&self, message: &str) {
        eprintln!("❌ {}", message);
    }
}

/// Kind of line captured by `RecordingSink`.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Say,
    Warn,
    Fail,
}

/// Keeps every line in memory. Used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_string()));
        }
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// All lines of one level, in order.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|(_, m)| m.contains(needle))
    }
}

#[cfg(test)]
impl OutputSink for RecordingSink {
    fn say(&self, message: &str) {
        self.push(Level::Say, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn fail(&self, message: &str) {
        self.push(Level::Fail, message);
    }
}
