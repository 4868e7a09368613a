use std::collections::VecDeque;

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Content,
    Ad,
}

/// One segment advertised in a live manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub uri: String,
    /// Duration in seconds
    pub duration: f32,
    /// Rendered as `#EXT-X-DISCONTINUITY` before this entry
    pub discontinuity: bool,
    pub kind: EntryKind,
}

impl Entry {
    pub fn content(uri: String, duration: f32) -> Self {
        Self {
            uri,
            duration,
            discontinuity: false,
            kind: EntryKind::Content,
        }
    }

    pub fn ad(uri: String, duration: f32) -> Self {
        Self {
            uri,
            duration,
            discontinuity: false,
            kind: EntryKind::Ad,
        }
    }
}

/// Immutable copy of a window, taken under the scheduler lock and handed to the writer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSnapshot {
    pub entries: Vec<Entry>,
    pub media_sequence: u64,
    pub discontinuity_sequence: u64,
}

/// Bounded FIFO of live entries for one rendition
///
/// Invariants:
/// - `len() <= capacity()` at all times
/// - `media_sequence` and `discontinuity_sequence` never decrease
/// - `discontinuity_sequence` grows by one for each evicted boundary entry
#[derive(Debug, Clone)]
pub struct LiveWindow {
    capacity: usize,
    entries: VecDeque<Entry>,
    media_sequence: u64,
    discontinuity_sequence: u64,
    pending_discontinuity: bool,
}

impl LiveWindow {
    /// Create an empty window; a zero capacity is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
            media_sequence: 0,
            discontinuity_sequence: 0,
            pending_discontinuity: false,
        }
    }

    /// Push an entry at the tail, evicting the head first when full
    ///
    /// A pending discontinuity is consumed by this entry. Returns the evicted
    /// entry, if any.
    pub fn append(&mut self, mut entry: Entry) -> Option<Entry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };

        if evicted.as_ref().is_some_and(|e| e.discontinuity) {
            self.discontinuity_sequence += 1;
        }

        if self.pending_discontinuity {
            entry.discontinuity = true;
            self.pending_discontinuity = false;
        }

        self.entries.push_back(entry);
        evicted
    }

    /// Flag the most recently appended entry as a discontinuity boundary
    pub fn mark_tail_discontinuity(&mut self) {
        if let Some(last) = self.entries.back_mut() {
            last.discontinuity = true;
        }
    }

    /// The next appended entry will be a discontinuity boundary
    pub fn set_pending_discontinuity(&mut self) {
        self.pending_discontinuity = true;
    }

    pub fn pending_discontinuity(&self) -> bool {
        self.pending_discontinuity
    }

    /// Raise the media sequence; lower values are ignored
    pub fn advance_media_sequence(&mut self, media_sequence: u64) {
        self.media_sequence = self.media_sequence.max(media_sequence);
    }

    pub fn tail_kind(&self) -> Option<EntryKind> {
        self.entries.back().map(|e| e.kind)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
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

    pub fn media_sequence(&self) -> u64 {
        self.media_sequence
    }

    pub fn discontinuity_sequence(&self) -> u64 {
        self.discontinuity_sequence
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            entries: self.entries.iter().cloned().collect(),
            media_sequence: self.media_sequence,
            discontinuity_sequence: self.discontinuity_sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(n: usize) -> Entry {
        Entry::content(format!("seg_{}.ts", n), 10.0)
    }

    fn uris(window: &LiveWindow) -> Vec<String> {
        window.entries().map(|e| e.uri.clone()).collect()
    }

    #[test]
    fn test_fills_then_slides_fifo() {
        let mut window = LiveWindow::new(3);

        for n in 0..3 {
            assert!(window.append(content(n)).is_none());
        }
        assert_eq!(window.len(), 3);

        let evicted = window.append(content(3)).unwrap();
        assert_eq!(evicted.uri, "seg_0.ts");
        assert_eq!(uris(&window), vec!["seg_1.ts", "seg_2.ts", "seg_3.ts"]);
        assert_eq!(window.len(), window.capacity());
    }

    #[test]
    fn test_discontinuity_sequence_counts_evicted_boundaries_only() {
        let mut window = LiveWindow::new(2);
        window.append(content(0));
        window.mark_tail_discontinuity();
        window.append(content(1));

        // Evicts seg_0, a boundary
        window.append(content(2));
        assert_eq!(window.discontinuity_sequence(), 1);

        // Evicts seg_1, not a boundary
        window.append(content(3));
        assert_eq!(window.discontinuity_sequence(), 1);
    }

    #[test]
    fn test_pending_discontinuity_applies_to_next_append_only() {
        let mut window = LiveWindow::new(5);
        window.append(content(0));
        window.set_pending_discontinuity();
        assert!(window.pending_discontinuity());

        window.append(content(1));
        window.append(content(2));

        let flags: Vec<bool> = window.entries().map(|e| e.discontinuity).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert!(!window.pending_discontinuity());
    }

    #[test]
    fn test_media_sequence_never_decreases() {
        let mut window = LiveWindow::new(5);
        window.advance_media_sequence(4);
        window.advance_media_sequence(2);
        assert_eq!(window.media_sequence(), 4);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut window = LiveWindow::new(0);
        window.append(content(0));
        window.append(content(1));
        assert_eq!(window.capacity(), 1);
        assert_eq!(uris(&window), vec!["seg_1.ts"]);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut window = LiveWindow::new(2);
        window.append(Entry::ad("ad_0.ts".to_string(), 5.0));
        let snapshot = window.snapshot();

        window.append(content(1));
        window.append(content(2));

        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].kind, EntryKind::Ad);
        assert_eq!(window.tail_kind(), Some(EntryKind::Content));
    }
}
