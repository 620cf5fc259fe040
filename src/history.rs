//! Bounded recognition history.
//!
//! Holds the most recent recognition records for display, oldest first.
//! Insertion only happens at the tail and eviction only at the head, so the
//! order always reflects recognition order.

use image::RgbImage;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::validate::AuthorizationStatus;
use crate::MAX_HISTORY_ENTRIES;

/// One recognized plate. Immutable once created.
#[derive(Clone, Debug)]
pub struct RecognitionRecord {
    plate_text: String,
    cropped_image: RgbImage,
    authorization: AuthorizationStatus,
    /// Index of the frame the plate was read from.
    frame_index: u64,
}

impl RecognitionRecord {
    pub fn new(
        plate_text: impl Into<String>,
        cropped_image: RgbImage,
        authorization: AuthorizationStatus,
        frame_index: u64,
    ) -> Self {
        Self {
            plate_text: plate_text.into(),
            cropped_image,
            authorization,
            frame_index,
        }
    }

    pub fn plate_text(&self) -> &str {
        &self.plate_text
    }

    pub fn cropped_image(&self) -> &RgbImage {
        &self.cropped_image
    }

    pub fn authorization(&self) -> AuthorizationStatus {
        self.authorization
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Point-in-time copy of the history, oldest first.
///
/// Records are shared with the cache, but neither the records nor the cache
/// can be mutated through a snapshot.
#[derive(Clone, Debug, Default)]
pub struct HistorySnapshot {
    records: Vec<Arc<RecognitionRecord>>,
}

impl HistorySnapshot {
    pub fn records(&self) -> &[Arc<RecognitionRecord>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecognitionRecord> {
        self.records.iter().map(|r| r.as_ref())
    }

    pub fn plate_texts(&self) -> Vec<&str> {
        self.iter().map(RecognitionRecord::plate_text).collect()
    }

    /// Most recent record.
    pub fn latest(&self) -> Option<&RecognitionRecord> {
        self.records.last().map(|r| r.as_ref())
    }
}

/// Fixed-capacity FIFO of recognition records.
///
/// No deduplication: the same plate read twice occupies two slots.
#[derive(Debug)]
pub struct HistoryCache {
    records: VecDeque<Arc<RecognitionRecord>>,
    capacity: usize,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ENTRIES)
    }

    /// Cache holding at most `capacity` records (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append at the tail, evicting from the head while over capacity.
    ///
    /// Returns the shared record now held by the cache.
    pub fn append(&mut self, record: RecognitionRecord) -> Arc<RecognitionRecord> {
        let record = Arc::new(record);
        self.records.push_back(record.clone());
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                log::debug!(
                    "history: evicted {} (frame {})",
                    evicted.plate_text(),
                    evicted.frame_index()
                );
            }
        }
        record
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            records: self.records.iter().cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, frame_index: u64) -> RecognitionRecord {
        RecognitionRecord::new(
            text,
            RgbImage::new(4, 2),
            AuthorizationStatus::Denied,
            frame_index,
        )
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut cache = HistoryCache::new();
        for i in 0..(MAX_HISTORY_ENTRIES as u64 * 3) {
            cache.append(record(&format!("P{}", i), i));
            assert!(cache.len() <= MAX_HISTORY_ENTRIES);
        }
        assert_eq!(cache.len(), MAX_HISTORY_ENTRIES);
    }

    #[test]
    fn keeps_most_recent_in_append_order() {
        let mut cache = HistoryCache::new();
        for i in 0..8 {
            cache.append(record(&format!("P{}", i), i));
        }
        assert_eq!(
            cache.snapshot().plate_texts(),
            vec!["P1", "P2", "P3", "P4", "P5", "P6", "P7"]
        );
    }

    #[test]
    fn duplicates_are_kept_in_place() {
        let mut cache = HistoryCache::with_capacity(4);
        cache.append(record("AAA111", 1));
        cache.append(record("BBB222", 2));
        cache.append(record("AAA111", 3));
        let snap = cache.snapshot();
        assert_eq!(snap.plate_texts(), vec!["AAA111", "BBB222", "AAA111"]);
        let frames: Vec<u64> = snap.iter().map(|r| r.frame_index()).collect();
        assert_eq!(frames, vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_is_point_in_time() {
        let mut cache = HistoryCache::with_capacity(2);
        cache.append(record("A", 1));
        let before = cache.snapshot();
        cache.append(record("B", 2));
        cache.append(record("C", 3));
        assert_eq!(before.plate_texts(), vec!["A"]);
        assert_eq!(cache.snapshot().plate_texts(), vec!["B", "C"]);
        assert_eq!(cache.snapshot().latest().map(|r| r.plate_text()), Some("C"));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut cache = HistoryCache::with_capacity(0);
        cache.append(record("A", 1));
        cache.append(record("B", 2));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.snapshot().plate_texts(), vec!["B"]);
    }
}
