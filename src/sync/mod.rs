//! Incremental-sync primitives: seen-key tracking, run counters, and
//! watermark windows.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, Utc};

/// How far back of the last watermark a sync window starts, to pick up
/// late stat corrections.
pub const WATERMARK_OVERLAP_DAYS: i64 = 3;

/// Dedup tracking over composite string keys.
///
/// Keys are ordered column values; equal values in equal order are the
/// same key. The tracker never evicts: a key seen once stays seen for
/// the life of the run.
pub trait SeenTracker {
    fn has_seen(&self, key: &[String]) -> bool;

    /// Record a key. Returns `false` when the key was already present.
    fn mark_seen(&mut self, key: &[String]) -> bool;
}

/// In-memory key set, usually preloaded from existing CSV rows.
#[derive(Debug, Default)]
pub struct KeySet {
    keys: HashSet<Vec<String>>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl SeenTracker for KeySet {
    fn has_seen(&self, key: &[String]) -> bool {
        self.keys.contains(key)
    }

    fn mark_seen(&mut self, key: &[String]) -> bool {
        self.keys.insert(key.to_vec())
    }
}

/// Outcome tallies for one sync run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunCounts {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunCounts {
    pub fn merge(&mut self, other: RunCounts) {
        self.added += other.added;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn summary(&self) -> String {
        format!(
            "{} added, {} skipped, {} failed",
            self.added, self.skipped, self.failed
        )
    }
}

/// Date window for an incremental stats run.
///
/// `since` takes precedence when given; otherwise the window opens a few
/// days before the stored watermark, and with no watermark at all the
/// window is unbounded (full scan).
pub fn sync_window(
    since: Option<NaiveDate>,
    watermark: Option<NaiveDate>,
) -> (Option<NaiveDate>, NaiveDate) {
    let up_to = Utc::now().date_naive();
    let start = match since {
        Some(date) => Some(date),
        None => watermark.map(|mark| mark - Duration::days(WATERMARK_OVERLAP_DAYS)),
    };
    (start, up_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keyset_marks_and_detects() {
        let mut set = KeySet::new();
        let k = key(&["401705432", "101"]);
        assert!(!set.has_seen(&k));
        assert!(set.mark_seen(&k));
        assert!(set.has_seen(&k));
        assert!(!set.mark_seen(&k));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn keys_are_order_sensitive() {
        let mut set = KeySet::new();
        set.mark_seen(&key(&["a", "b"]));
        assert!(!set.has_seen(&key(&["b", "a"])));
    }

    #[test]
    fn window_prefers_explicit_since() {
        let since = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let mark = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let (start, _) = sync_window(Some(since), Some(mark));
        assert_eq!(start, Some(since));
    }

    #[test]
    fn window_backs_off_the_watermark() {
        let mark = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        let (start, up_to) = sync_window(None, Some(mark));
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 7));
        assert!(up_to >= mark);
    }

    #[test]
    fn window_is_unbounded_without_a_watermark() {
        let (start, _) = sync_window(None, None);
        assert_eq!(start, None);
    }
}
