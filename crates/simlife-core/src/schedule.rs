//! Frame scheduler: deferred one-shot tasks drained once per tick.
//!
//! Tasks are plain data; the caller interprets them and is responsible for
//! guarding each against target liveness (a task aimed at a destroyed
//! scene node must become a no-op, not an error). Nothing here blocks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

struct Entry<T> {
    fire_at: Duration,
    seq: u64,
    task: T,
}

// Min-heap ordering on (fire_at, seq); seq keeps equal deadlines FIFO.
impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.fire_at, other.seq).cmp(&(self.fire_at, self.seq))
    }
}

pub struct Scheduler<T> {
    heap: BinaryHeap<Entry<T>>,
    now: Duration,
    seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            now: Duration::ZERO,
            seq: 0,
        }
    }

    /// Schedules `task` to fire `delay` after the current frame clock.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let entry = Entry {
            fire_at: self.now + delay,
            seq: self.seq,
            task,
        };
        self.seq += 1;
        self.heap.push(entry);
    }

    /// Advances the frame clock by `dt` and returns every task now due,
    /// in firing order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;
        let mut due = Vec::new();
        while let Some(head) = self.heap.peek() {
            if head.fire_at > self.now {
                break;
            }
            if let Some(entry) = self.heap.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    pub fn pending(&self) -> usize {
        self.heap.len()
    }
}
