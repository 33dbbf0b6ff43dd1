//! Key-unique statistic table that iterates in first-seen order.

use crate::model::statistic::{Accumulator, StatisticKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct StatEntry {
    pub key: String,
    /// Display name from the first record for this key, if the stream has one.
    pub name: Option<String>,
    acc: Accumulator,
}

impl StatEntry {
    pub fn value(&self) -> f64 {
        self.acc.value()
    }
}

/// Growable table of per-key statistics.
///
/// Entries live in a Vec so emission follows insertion order; the index maps
/// keys to their slot.
#[derive(Debug, Clone)]
pub struct StatTable {
    kind: StatisticKind,
    entries: Vec<StatEntry>,
    index: HashMap<String, usize>,
}

impl StatTable {
    pub fn new(kind: StatisticKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Fold `value` into the entry for `key`, creating it on first sight.
    pub fn observe(&mut self, key: &str, name: Option<&str>, value: f64) {
        if let Some(&slot) = self.index.get(key) {
            self.entries[slot].acc.observe(value);
            return;
        }

        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push(StatEntry {
            key: key.to_string(),
            name: name.map(str::to_string),
            acc: Accumulator::start(self.kind, value),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatEntry> {
        self.entries.iter()
    }
}
