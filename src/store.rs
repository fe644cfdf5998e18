use std::collections::VecDeque;

use crate::sample::Sample;

/// Hard cap on retained samples. Oldest samples are evicted FIFO on
/// overflow; overflow is sliding-window behavior, not an error.
pub const MAX_SAMPLES: usize = 2000;

/// Bounded, append-only-with-eviction buffer of reconstructed samples.
///
/// Single writer (the ingestion session); readers only ever receive owned
/// snapshots, so a snapshot taken before an append is never corrupted by it.
#[derive(Debug)]
pub struct SeriesStore {
    data: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SAMPLES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends in arrival order, evicting the oldest sample when full.
    pub fn push(&mut self, sample: Sample) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(sample);
    }

    /// The most recent `n` samples (or fewer), oldest first. Copy-on-read.
    pub fn window(&self, n: usize) -> Vec<Sample> {
        self.data.iter().rev().take(n).rev().cloned().collect()
    }

    /// Every stored sample in arrival order. Copy-on-read.
    pub fn all(&self) -> Vec<Sample> {
        self.data.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.data.back()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(relative_s: f64, value: f64) -> Sample {
        Sample {
            relative_s,
            wall_clock: "00:00:00".to_owned(),
            values: vec![value],
        }
    }

    #[test]
    fn overflow_evicts_the_oldest_fifo() {
        let mut store = SeriesStore::new();
        for i in 0..(MAX_SAMPLES + 1) {
            store.push(sample(i as f64, i as f64));
        }
        assert_eq!(store.len(), MAX_SAMPLES);
        let all = store.all();
        // The first-fed sample is gone; the rest keep their original order.
        assert_eq!(all[0].values[0], 1.0);
        assert_eq!(all[MAX_SAMPLES - 1].values[0], MAX_SAMPLES as f64);
        assert!(all.windows(2).all(|w| w[0].relative_s <= w[1].relative_s));
    }

    #[test]
    fn window_returns_the_most_recent_in_order() {
        let mut store = SeriesStore::with_capacity(10);
        for i in 0..5 {
            store.push(sample(i as f64, i as f64));
        }
        let window = store.window(3);
        assert_eq!(
            window.iter().map(|s| s.values[0]).collect::<Vec<_>>(),
            vec![2.0, 3.0, 4.0]
        );
        // Asking for more than stored returns everything.
        assert_eq!(store.window(100).len(), 5);
    }

    #[test]
    fn snapshots_are_unaffected_by_later_appends() {
        let mut store = SeriesStore::with_capacity(10);
        store.push(sample(0.0, 1.0));
        let snapshot = store.all();
        store.push(sample(1.0, 2.0));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = SeriesStore::with_capacity(10);
        store.push(sample(0.0, 1.0));
        store.clear();
        assert!(store.is_empty());
        assert!(store.latest().is_none());
    }
}
