//! Bounded display log of engine traffic.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Default number of entries kept before the oldest are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToEngine,
    FromEngine,
    /// Viewer-side message about the link itself.
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub direction: Direction,
    pub message: String,
    /// Milliseconds since the log was created.
    pub elapsed_ms: u64,
}

#[derive(Debug)]
pub struct EngineLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    started: Instant,
}

impl Default for EngineLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EngineLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity: capacity.max(1),
            started: Instant::now(),
        }
    }

    pub fn push(&mut self, direction: Direction, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            direction,
            message: message.into(),
            elapsed_ms: duration_ms(self.started.elapsed()),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `count` entries, oldest first.
    pub fn tail(&self, count: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(count))
    }

    /// Messages received from the engine, oldest first.
    pub fn received(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.direction == Direction::FromEngine)
            .map(|e| e.message.as_str())
    }

    /// Messages sent to the engine, oldest first.
    pub fn sent(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.direction == Direction::ToEngine)
            .map(|e| e.message.as_str())
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = EngineLog::with_capacity(3);
        for msg in ["a", "b", "c", "d"] {
            log.push(Direction::FromEngine, msg);
        }
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_tail_and_filters() {
        let mut log = EngineLog::default();
        log.push(Direction::ToEngine, "uci");
        log.push(Direction::FromEngine, "id name Stub");
        log.push(Direction::FromEngine, "uciok");
        log.push(Direction::Notice, "Engine ready");

        let tail: Vec<_> = log.tail(2).map(|e| e.message.as_str()).collect();
        assert_eq!(tail, vec!["uciok", "Engine ready"]);
        assert_eq!(log.received().collect::<Vec<_>>(), vec!["id name Stub", "uciok"]);
        assert_eq!(log.sent().collect::<Vec<_>>(), vec!["uci"]);
        assert_eq!(log.tail(10).count(), 4);
    }
}
