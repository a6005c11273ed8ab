//! Secondary index over catalog lines.

use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt;

/// Stable handle to a line stored in a [`Dex`](crate::Dex).
///
/// Indices hold handles rather than lines, so dropping a line from an
/// index never needs to compare line contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(u32);

impl LineId {
    /// Creates a handle from a slot number.
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the slot number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Multi-valued index from a normalized field value to line handles.
///
/// Buckets keep insertion order until [`FieldIndex::sort_buckets`] is
/// called. A handle appears at most once per bucket.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    /// Field this index covers, for diagnostics.
    name: &'static str,
    /// Value to handles mapping.
    buckets: HashMap<String, IndexSet<LineId>>,
    /// Total handle count across buckets.
    count: usize,
}

impl FieldIndex {
    /// Creates an empty index.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            buckets: HashMap::new(),
            count: 0,
        }
    }

    /// Name of the indexed field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds a handle under a value. Returns false if already present.
    pub fn insert(&mut self, value: String, id: LineId) -> bool {
        let inserted = self.buckets.entry(value).or_default().insert(id);
        if inserted {
            self.count += 1;
        }
        inserted
    }

    /// Removes a handle from under a value. Returns false if absent.
    pub fn remove(&mut self, value: &str, id: LineId) -> bool {
        if let Some(bucket) = self.buckets.get_mut(value) {
            if bucket.shift_remove(&id) {
                self.count -= 1;
                if bucket.is_empty() {
                    self.buckets.remove(value);
                }
                return true;
            }
        }
        false
    }

    /// Handles filed under a value, in bucket order.
    pub fn lookup(&self, value: &str) -> impl Iterator<Item = LineId> + '_ {
        self.buckets.get(value).into_iter().flatten().copied()
    }

    /// Returns true if any handle is filed under the value.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.buckets.contains_key(value)
    }

    /// Returns true if the handle is filed under the value.
    #[must_use]
    pub fn contains_line(&self, value: &str, id: LineId) -> bool {
        self.buckets
            .get(value)
            .is_some_and(|bucket| bucket.contains(&id))
    }

    /// Iterates every indexed value.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Iterates every `(value, handle)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, LineId)> {
        self.buckets
            .iter()
            .flat_map(|(value, ids)| ids.iter().map(move |&id| (value.as_str(), id)))
    }

    /// Total number of handles across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Stably sorts every bucket by a key derived from the handle.
    pub fn sort_buckets<K: Ord>(&mut self, mut key: impl FnMut(LineId) -> K) {
        for bucket in self.buckets.values_mut() {
            bucket.sort_by_cached_key(|&id| key(id));
        }
    }

    /// Clears the index.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
    }
}
