//! Undo history over full-surface snapshots.
//!
//! The log is linear: committing after an undo drops every entry past the
//! cursor, so there is never a redo branch to return to.

use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An immutable copy of the surface raster at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl HistoryEntry {
    pub(crate) fn new(width: u32, height: u32, pixels: Arc<[u8]>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes of pixel data held by this entry.
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// History limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of entries kept; the oldest are evicted first.
    /// `None` keeps everything (bounded only by memory).
    #[serde(default)]
    pub max_entries: Option<usize>,
}

/// Snapshot log plus a cursor to the entry the surface currently shows.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    current: usize,
    config: HistoryConfig,
}

impl History {
    /// Seed the log with a snapshot of the (blank) surface.
    pub fn new(surface: &Surface) -> Self {
        Self::with_config(surface, HistoryConfig::default())
    }

    pub fn with_config(surface: &Surface, config: HistoryConfig) -> Self {
        Self {
            entries: vec![surface.snapshot()],
            current: 0,
            config,
        }
    }

    /// Record the surface as the newest state.
    ///
    /// Entries after the cursor are discarded first.
    pub fn commit(&mut self, surface: &Surface) {
        let snapshot = surface.snapshot();

        let discarded = self.entries.len() - (self.current + 1);
        if discarded > 0 {
            log::debug!("Discarding {} undone history entries", discarded);
            self.entries.truncate(self.current + 1);
        }

        self.entries.push(snapshot);
        self.current = self.entries.len() - 1;

        if let Some(max) = self.config.max_entries {
            let max = max.max(1);
            if self.entries.len() > max {
                let evicted = self.entries.len() - max;
                self.entries.drain(..evicted);
                self.current -= evicted;
                log::debug!("Evicted {} oldest history entries", evicted);
            }
        }
    }

    /// Move the cursor back one entry and copy that snapshot onto the surface.
    ///
    /// False when the cursor already sits on the oldest entry, or when the
    /// surface rejects the snapshot; the cursor stays put in both cases.
    pub fn undo(&mut self, surface: &mut Surface) -> bool {
        if self.current == 0 {
            return false;
        }

        let target = self.current - 1;
        match surface.restore(&self.entries[target]) {
            Ok(()) => {
                self.current = target;
                true
            }
            Err(e) => {
                log::error!("Undo failed, history left unchanged: {}", e);
                false
            }
        }
    }

    /// True while the cursor has an older entry to fall back to.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Whether the Clear action should be enabled. Always true once seeded.
    pub fn can_clear(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The entry the surface currently shows.
    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.current]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true after construction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Total raster bytes retained by the log.
    pub fn memory_usage(&self) -> usize {
        self.entries.iter().map(HistoryEntry::byte_len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use kurbo::Point;

    fn surface() -> Surface {
        Surface::new(16.0, 16.0, 1.0).unwrap()
    }

    fn mark(surface: &mut Surface, x: f64) {
        surface.fill_dot(Point::new(x, 4.0), 2.0, Rgba::BLACK, 1.0);
    }

    #[test]
    fn test_history_starts_with_blank_entry() {
        let s = surface();
        let history = History::new(&s);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current_index(), 0);
        assert!(!history.can_undo());
        assert!(history.can_clear());
        assert_eq!(history.current().pixels(), s.pixels());
    }

    #[test]
    fn test_commit_and_undo() {
        let mut s = surface();
        let mut history = History::new(&s);

        mark(&mut s, 4.0);
        history.commit(&s);
        assert_eq!(history.len(), 2);
        assert!(history.can_undo());

        assert!(history.undo(&mut s));
        assert!(s.is_blank());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut s = surface();
        let mut history = History::new(&s);
        mark(&mut s, 4.0);

        // Uncommitted paint is left alone when there is nothing to undo.
        assert!(!history.undo(&mut s));
        assert!(!s.is_blank());
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn test_rejected_restore_keeps_cursor() {
        let small = surface();
        let mut history = History::new(&small);
        let mut grown = small.clone();
        mark(&mut grown, 4.0);
        history.commit(&grown);

        let mut other = Surface::new(8.0, 8.0, 1.0).unwrap();
        assert!(!history.undo(&mut other));
        assert_eq!(history.current_index(), 1);
        assert!(history.can_undo());
        assert!(other.is_blank());

        assert!(history.undo(&mut grown));
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn test_commit_after_undo_discards_future() {
        let mut s = surface();
        let mut history = History::new(&s);
        for x in [2.0, 6.0, 10.0] {
            mark(&mut s, x);
            history.commit(&s);
        }
        assert_eq!(history.len(), 4);

        history.undo(&mut s);
        history.undo(&mut s);
        let index_before = history.current_index();
        assert_eq!(index_before, 1);

        mark(&mut s, 14.0);
        history.commit(&s);
        assert_eq!(history.len(), index_before + 2);
        assert_eq!(history.current_index(), history.len() - 1);
    }

    #[test]
    fn test_n_undos_return_to_blank() {
        let mut s = surface();
        let mut history = History::new(&s);
        for x in [1.0, 3.0, 5.0, 7.0, 9.0] {
            mark(&mut s, x);
            history.commit(&s);
        }
        for _ in 0..5 {
            assert!(history.undo(&mut s));
        }
        assert!(s.is_blank());
        assert!(!history.undo(&mut s));
    }

    #[test]
    fn test_max_entries_evicts_oldest() {
        let mut s = surface();
        let mut history = History::with_config(
            &s,
            HistoryConfig {
                max_entries: Some(3),
            },
        );
        for x in [1.0, 5.0, 9.0, 13.0] {
            mark(&mut s, x);
            history.commit(&s);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current_index(), 2);

        assert!(history.undo(&mut s));
        assert!(history.undo(&mut s));
        assert!(!history.undo(&mut s));
        // The blank state was evicted; the oldest kept state has two marks.
        assert!(!s.is_blank());
    }

    #[test]
    fn test_memory_usage() {
        let mut s = surface();
        let mut history = History::new(&s);
        mark(&mut s, 4.0);
        history.commit(&s);
        assert_eq!(history.memory_usage(), 2 * 16 * 16 * 4);
    }
}
