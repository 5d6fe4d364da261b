//! Bounded command history
//!
//! A fixed number of slots, each holding one raw command line and the
//! logical timestamp it was recorded at. Recording always overwrites the
//! slot with the smallest timestamp, so once every slot is used the oldest
//! entry is evicted. Never-used slots count as older than any entry.

use std::fmt;

/// Number of slots when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 10;

/// Longest stored command text, in bytes.
pub const MAX_ENTRY_LEN: usize = 255;

/// One recorded command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: u64,
    pub command: String,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp, self.command)
    }
}

#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<Option<HistoryEntry>>,
    /// Next timestamp to hand out. Starts at 1, never reset.
    counter: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    /// Create an empty history with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        History {
            slots: vec![None; capacity.max(1)],
            counter: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Store `command`, evicting the oldest entry if every slot is taken.
    ///
    /// Returns the timestamp assigned to the new entry.
    pub fn record(&mut self, command: &str) -> u64 {
        let slot = self.eviction_target();
        let timestamp = self.counter;
        self.counter += 1;
        self.slots[slot] = Some(HistoryEntry {
            timestamp,
            command: truncate(command, MAX_ENTRY_LEN).to_string(),
        });
        timestamp
    }

    /// Occupied slots, ascending by timestamp.
    pub fn list(&self) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> = self.slots.iter().flatten().collect();
        entries.sort_by_key(|entry| entry.timestamp);
        entries
    }

    /// Slot with the minimum timestamp; empty slots are 0, ties go to the
    /// lowest index.
    fn eviction_target(&self) -> usize {
        let mut target = 0;
        let mut oldest = u64::MAX;
        for (i, slot) in self.slots.iter().enumerate() {
            let timestamp = slot.as_ref().map_or(0, |entry| entry.timestamp);
            if timestamp < oldest {
                oldest = timestamp;
                target = i;
            }
        }
        target
    }
}

/// Cut `text` to at most `max` bytes without splitting a character.
pub(crate) fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
