// src/services/history.rs
use crate::models::GenerationResult;
use parking_lot::Mutex;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 4;

/// Most recent generations, oldest evicted first.
pub struct GenerationHistory {
    capacity: usize,
    entries: Mutex<VecDeque<GenerationResult>>,
}

impl GenerationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    pub fn push(&self, result: GenerationResult) {
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            if let Some(evicted) = entries.pop_front() {
                log::debug!("Evicting generation {} from history", evicted.id);
            }
        }
        entries.push_back(result);
    }

    /// Newest first.
    pub fn recent(&self) -> Vec<GenerationResult> {
        self.entries.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl Default for GenerationHistory {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
