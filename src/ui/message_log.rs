use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::sync::LogLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub text: String,
}

impl LogEntry {
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.text)
    }
}

/// User facing message log. Oldest lines are dropped once `capacity` is hit.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, level: LogLevel, text: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: chrono::Local::now().naive_local(),
            level,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_beyond_capacity() {
        let mut log = MessageLog::new(3);
        for i in 0..5 {
            log.push(LogLevel::Info, format!("line {i}"));
        }

        let lines: Vec<_> = log.entries().map(|e| e.text.as_str()).collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn zero_capacity_keeps_latest_line() {
        let mut log = MessageLog::new(0);
        log.push(LogLevel::Info, "a");
        log.push(LogLevel::Error, "b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.last().map(|e| e.level), Some(LogLevel::Error));
    }

    #[test]
    fn render_prefixes_time() {
        let mut log = MessageLog::default();
        log.push(LogLevel::Warn, "Light 1 state => unknown (MAYBE)");
        let rendered = log.last().unwrap().render();
        assert!(rendered.starts_with('['));
        assert!(rendered.ends_with("] Light 1 state => unknown (MAYBE)"));
    }
}
