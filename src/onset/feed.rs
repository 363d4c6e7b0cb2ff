use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use super::record::OnsetRecord;

/// Shared, append-only view of the records an analysis pass has finalized.
///
/// The analysis thread is the only writer and only ever appends records whose
/// threshold and peak fields are settled, so a record read from the feed never
/// changes afterwards. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct OnsetFeed {
    inner: Arc<FeedInner>,
}

#[derive(Debug, Default)]
struct FeedInner {
    records: RwLock<Vec<OnsetRecord>>,
    finished: AtomicBool,
}

impl OnsetFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<OnsetRecord>> {
        self.inner.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Safe read length: every index below it is final.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<OnsetRecord> {
        self.read().get(index).cloned()
    }

    pub fn snapshot(&self) -> Vec<OnsetRecord> {
        self.read().clone()
    }

    /// Records in `range`, clamped to what has been published so far.
    pub fn range(&self, range: Range<usize>) -> Vec<OnsetRecord> {
        let records = self.read();
        let end = range.end.min(records.len());
        let start = range.start.min(end);
        records[start..end].to_vec()
    }

    pub fn peaks(&self) -> Vec<OnsetRecord> {
        self.read().iter().filter(|r| r.is_peak).cloned().collect()
    }

    /// True once the producing pass has ended, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    /// Records to draw around window `current`, at most `size` of them.
    ///
    /// With no current window (or window 0) the trailing `size` records are
    /// returned instead, for following a pass that is still running.
    pub fn display_window(&self, current: Option<usize>, size: usize) -> Vec<OnsetRecord> {
        let records = self.read();
        let len = records.len();
        let (start, end) = match current.filter(|&c| c > 0) {
            Some(cur) => (
                cur.saturating_sub(size / 2),
                (cur + size / 2).min(len.saturating_sub(1)),
            ),
            None => {
                let start = len.saturating_sub(size + 1);
                (start, (start + size).min(len))
            }
        };
        if start >= end {
            return Vec::new();
        }
        records[start..end].to_vec()
    }

    /// Appends the part of `finalized` not yet published.
    pub(crate) fn publish(&self, finalized: &[OnsetRecord]) {
        let mut records = self.inner.records.write().unwrap_or_else(PoisonError::into_inner);
        if finalized.len() > records.len() {
            let from = records.len();
            records.extend_from_slice(&finalized[from..]);
        }
    }

    pub(crate) fn finish(&self) {
        self.inner.finished.store(true, Ordering::Release);
    }
}

/// Analysis window that contains playback position `time`.
pub fn window_index_for_time(time: f32, sample_rate: u32, window_size: usize) -> usize {
    if !time.is_finite() || time <= 0.0 || window_size == 0 {
        return 0;
    }
    let sample = (time * sample_rate as f32).floor() as usize;
    sample / window_size
}
