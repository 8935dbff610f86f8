//! Fixed-capacity command history for the session.

/// Default number of retained entries, from the original shell.
pub const DEFAULT_CAPACITY: usize = 100;

/// Ordered buffer of accepted command lines. Consecutive duplicates
/// collapse into one entry; once full, the oldest entry is evicted.
#[derive(Debug)]
pub struct History {
    entries: Vec<String>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record one accepted line. Empty lines and lines equal to the
    /// immediately preceding entry are skipped.
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        if self.entries.last().map(String::as_str) == Some(line) {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.remove(0);
        }
        self.entries.push(line.to_string());
    }

    /// Most recently stored entry, for `!!`.
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
