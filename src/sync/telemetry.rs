//! Rolling window for streamed sensor readings

use std::collections::VecDeque;

/// Number of readings kept for the temperature chart
pub const WINDOW_CAPACITY: usize = 15;

/// A reading stamped with its arrival order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReading {
    pub seq: u64,
    pub value: f64,
}

/// Bounded FIFO. Appends at the tail, evicts from the head, never reorders.
#[derive(Debug, Clone)]
pub struct TelemetryWindow {
    readings: VecDeque<TelemetryReading>,
    capacity: usize,
    next_seq: u64,
}

impl Default for TelemetryWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryWindow {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity + 1),
            capacity,
            next_seq: 0,
        }
    }

    /// Values are accepted as-is, NaN and negatives included
    pub fn push(&mut self, value: f64) {
        self.readings.push_back(TelemetryReading {
            seq: self.next_seq,
            value,
        });
        self.next_seq += 1;

        if self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.value).collect()
    }

    pub fn readings(&self) -> impl Iterator<Item = &TelemetryReading> {
        self.readings.iter()
    }

    pub fn latest(&self) -> Option<f64> {
        self.readings.back().map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }
}
