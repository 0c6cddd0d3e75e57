//! Slot and entry model of the flat slot array

/// A key stored in the table together with its tombstone flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry<K> {
    /// The stored key
    pub(crate) key: K,
    /// Set when the key was removed. The slot still counts as occupied while probing.
    pub(crate) tombstoned: bool,
}

impl<K> Entry<K> {
    /// Creates a live entry
    pub(crate) fn live(key: K) -> Self {
        Self { key, tombstoned: false }
    }

    /// Overwrites a tombstoned entry in place with a new live key
    pub(crate) fn revive(&mut self, key: K) {
        self.key = key;
        self.tombstoned = false;
    }
}

/// One position of the slot array
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Slot<K> {
    /// Never written since the array was allocated
    #[default]
    Empty,
    /// Holds an entry, live or tombstoned
    Occupied(Entry<K>),
}

impl<K> Slot<K> {
    /// The entry's key if this slot holds a live member
    pub(crate) fn live_key(&self) -> Option<&K> {
        match self {
            Self::Occupied(entry) if !entry.tombstoned => Some(&entry.key),
            _ => None,
        }
    }

    /// Consumes the slot, keeping the key only if it is live
    pub(crate) fn into_live_key(self) -> Option<K> {
        match self {
            Self::Occupied(entry) if !entry.tombstoned => Some(entry.key),
            _ => None,
        }
    }
}
