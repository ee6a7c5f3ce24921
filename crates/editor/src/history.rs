//! Snapshot-based undo/redo history.
//!
//! A single linear sequence of deep snapshots, no branching. Recording past
//! the cap evicts the oldest entry; recording a state identical to the
//! current one is a no-op, so autosave ticks without real changes never
//! pollute the history.

use deck_core::types::Presentation;
use serde_json::Value;

/// Maximum number of retained snapshots.
pub const MAX_ENTRIES: usize = 50;

/// One immutable snapshot plus its canonical form for deduplication.
struct HistoryEntry {
    snapshot: Presentation,
    canonical: String,
}

/// Serialize a presentation with volatile fields (timestamps) stripped, so
/// equality means "the same logical state".
fn canonical_form(presentation: &Presentation) -> String {
    let mut value = serde_json::to_value(presentation).unwrap_or(Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.remove("created_at");
        object.remove("updated_at");
    }
    value.to_string()
}

/// Linear undo/redo history over presentation snapshots.
pub struct History {
    entries: Vec<HistoryEntry>,
    /// Current position; `None` when nothing has been recorded yet.
    index: Option<usize>,
}

impl History {
    /// Empty history.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: None,
        }
    }

    /// Record a snapshot of the given state.
    ///
    /// Returns false when the state is identical to the current entry
    /// (ignoring timestamps) and nothing was recorded. Otherwise any redo
    /// tail is discarded, the snapshot appended, and the oldest entry
    /// evicted once the cap is exceeded.
    pub fn record(&mut self, presentation: &Presentation) -> bool {
        let canonical = canonical_form(presentation);

        if let Some(index) = self.index {
            if self.entries[index].canonical == canonical {
                return false;
            }
            self.entries.truncate(index + 1);
        } else {
            self.entries.clear();
        }

        self.entries.push(HistoryEntry {
            snapshot: presentation.clone(),
            canonical,
        });

        if self.entries.len() > MAX_ENTRIES {
            self.entries.remove(0);
            log::debug!("history cap reached, evicted oldest snapshot");
        }

        self.index = Some(self.entries.len() - 1);
        true
    }

    /// Step back and return a deep copy of the previous snapshot.
    /// A no-op returning `None` at the start of history.
    pub fn undo(&mut self) -> Option<Presentation> {
        let index = self.index?;
        if index == 0 {
            return None;
        }
        self.index = Some(index - 1);
        Some(self.entries[index - 1].snapshot.clone())
    }

    /// Step forward and return a deep copy of the next snapshot.
    /// A no-op returning `None` at the end of history.
    pub fn redo(&mut self) -> Option<Presentation> {
        let index = self.index?;
        if index + 1 >= self.entries.len() {
            return None;
        }
        self.index = Some(index + 1);
        Some(self.entries[index + 1].snapshot.clone())
    }

    /// True when an undo step is available.
    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(index) if index > 0)
    }

    /// True when a redo step is available.
    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(index) if index + 1 < self.entries.len())
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all snapshots.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
