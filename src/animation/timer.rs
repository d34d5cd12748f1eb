//! Timer queue: a min-heap of items keyed by the time they become due.
//!
//! Items due at the same instant come out in insertion order. Every pushed item
//! gets a [`TimerKey`] so it can be cancelled before it fires.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use instant::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerKey(u64);

#[derive(Debug)]
struct Entry<T> {
    fire_at: Duration,
    key: TimerKey,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.fire_at == other.fire_at && self.key == other.key
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
        self.fire_at
            .cmp(&other.fire_at)
            .then_with(|| self.key.0.cmp(&other.key.0))
    }
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_key: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_key: 0,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fire_at: Duration, item: T) -> TimerKey {
        let key = TimerKey(self.next_key);
        self.next_key += 1;
        self.heap.push(Reverse(Entry { fire_at, key, item }));
        key
    }

    /// Removes and returns the earliest item if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        if self.peek_time()? > now {
            return None;
        }
        self.heap
            .pop()
            .map(|Reverse(entry)| (entry.fire_at, entry.item))
    }

    pub fn peek_time(&self) -> Option<Duration> {
        self.heap.peek().map(|Reverse(entry)| entry.fire_at)
    }

    /// Drops every item the predicate matches and reports how many went.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| !predicate(&entry.item));
        before - self.heap.len()
    }

    pub fn cancel(&mut self, key: TimerKey) -> bool {
        let before = self.heap.len();
        self.heap.retain(|Reverse(entry)| entry.key != key);
        before != self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending items in no particular order, with their fire times.
    pub fn iter(&self) -> impl Iterator<Item = (Duration, &T)> + '_ {
        self.heap
            .iter()
            .map(|Reverse(entry)| (entry.fire_at, &entry.item))
    }
}
