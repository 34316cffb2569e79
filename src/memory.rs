//! Bounded window of recent conversation turns.
//!
//! A single buffer is shared by every request the process serves. There is
//! no per-caller keying, so concurrent users see each other's turns in their
//! context. Individual pushes are atomic; ordering across overlapping
//! requests is not.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use log::debug;

use crate::web::models::{Message, Role};

pub const DEFAULT_CAPACITY: usize = 6;

#[derive(Debug)]
pub struct MemoryBuffer {
    turns: Mutex<VecDeque<Message>>,
    capacity: usize,
}

impl MemoryBuffer {
    /// Creates an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a turn, evicting from the front until the buffer fits.
    pub fn push(&self, role: Role, content: impl Into<String>) {
        let mut turns = self.lock();
        turns.push_back(Message::new(role, content));
        while turns.len() > self.capacity {
            if let Some(evicted) = turns.pop_front() {
                debug!("Evicted {:?} turn from memory", evicted.role);
            }
        }
    }

    /// Copy of the current turns, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-updated,
    // so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.turns.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn contents(buffer: &MemoryBuffer) -> Vec<String> {
        buffer.snapshot().into_iter().map(|m| m.content).collect()
    }

    #[test]
    fn keeps_append_order() {
        let buffer = MemoryBuffer::default();
        buffer.push(Role::User, "hi");
        buffer.push(Role::Assistant, "hello");

        let turns = buffer.snapshot();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Message::new(Role::User, "hi"));
        assert_eq!(turns[1], Message::new(Role::Assistant, "hello"));
    }

    #[test]
    fn evicts_oldest_first() {
        let buffer = MemoryBuffer::new(6);
        for i in 0..9 {
            buffer.push(Role::User, format!("turn {i}"));
            assert!(buffer.len() <= 6);
        }
        assert_eq!(
            contents(&buffer),
            vec!["turn 3", "turn 4", "turn 5", "turn 6", "turn 7", "turn 8"]
        );
    }

    #[test]
    fn zero_capacity_holds_one_turn() {
        let buffer = MemoryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.push(Role::User, "a");
        buffer.push(Role::User, "b");
        assert_eq!(contents(&buffer), vec!["b"]);
    }

    #[test]
    fn concurrent_pushes_stay_bounded() {
        let buffer = Arc::new(MemoryBuffer::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        buffer.push(Role::User, format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(buffer.len(), 6);
    }
}
