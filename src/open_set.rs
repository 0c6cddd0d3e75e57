use std::{borrow::Borrow, hash::Hash, iter::FusedIterator, mem};

use tracing::{debug, error, trace};

use crate::{
    error::{DuplicateKey, InsertError, NotFound, ResizeError},
    hashing::ProbeSequence,
    slot::{Entry, Slot},
};

/// Marker returned when a key became a live member of the set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted;

/// Marker returned when a live key was tombstoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removed;

/// Point-in-time occupancy figures of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableStats {
    /// Number of slots
    pub capacity: usize,
    /// Slots holding live keys
    pub live: usize,
    /// Slots holding removed keys that still take part in probing
    pub tombstones: usize,
    /// Slots never written since the last resize
    pub empty: usize,
}

/// What a walk along a key's probe sequence ran into
#[derive(Debug, Clone, Copy, Default)]
struct ProbeOutcome {
    /// Slot holding the key as a live member
    found: Option<usize>,
    /// First tombstoned slot passed on the way
    reusable: Option<usize>,
    /// Empty slot that ended the walk
    empty: Option<usize>,
    /// Slots inspected, including the final one
    probes: usize,
}

/// A hash set using open addressing with double hashing and tombstone deletion.
///
/// All keys live in one flat slot array. Removing a key only flags its entry as tombstoned,
/// so probe sequences of other keys that pass through the slot stay intact; a later insert may
/// revive the slot in place. Tombstones are reclaimed only when the table doubles.
///
/// Growth is driven by live membership alone: the table doubles once
/// `live / capacity` reaches 3/4, and tombstones do not count towards that ratio.
///
/// Note: This implementation is not thread-safe. Wrap it in a lock for shared mutation.
#[derive(Debug, Clone)]
pub struct OpenAddressingSet<K> {
    /// The slot array, its length is the capacity
    slots: Vec<Slot<K>>,
    /// Number of live keys
    live: usize,
    /// Number of occupied slots, live or tombstoned
    occupied: usize,
}

impl<K> Default for OpenAddressingSet<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> OpenAddressingSet<K>
where
    K: Eq + Hash,
{
    /// Capacity of a freshly created set
    pub const INITIAL_CAPACITY: usize = 8;
    /// Factor applied to the capacity on every resize
    pub const GROWTH_FACTOR: usize = 2;
    /// Numerator of the live load factor that triggers a resize
    pub const MAX_LOAD_NUMERATOR: usize = 3;
    /// Denominator of the live load factor that triggers a resize
    pub const MAX_LOAD_DENOMINATOR: usize = 4;

    /// Creates an empty set with `INITIAL_CAPACITY` slots
    #[must_use]
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(Self::INITIAL_CAPACITY);
        slots.resize_with(Self::INITIAL_CAPACITY, Slot::default);
        Self { slots, live: 0, occupied: 0 }
    }

    /// Adds `key` to the set.
    ///
    /// Grows the table first when the live load factor has reached 3/4, even if `key` turns
    /// out to be a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::Duplicate`] if `key` is already live. The other variants are
    /// fatal: the table could not grow, or no usable slot exists on the probe sequence.
    pub fn insert(&mut self, key: K) -> Result<Inserted, InsertError> {
        if self.at_load_limit() {
            self.grow()?;
        }

        let outcome = self.probe(&key);
        if outcome.found.is_some() {
            return Err(DuplicateKey.into());
        }

        if let Some(index) = outcome.reusable
            && let Some(Slot::Occupied(entry)) = self.slots.get_mut(index)
        {
            trace!(index, "reviving tombstoned slot");
            entry.revive(key);
            self.live = self.live.saturating_add(1);
            return Ok(Inserted);
        }

        if let Some(index) = outcome.empty
            && let Some(slot) = self.slots.get_mut(index)
        {
            *slot = Slot::Occupied(Entry::live(key));
            self.live = self.live.saturating_add(1);
            self.occupied = self.occupied.saturating_add(1);
            return Ok(Inserted);
        }

        Err(InsertError::ProbeExhausted { capacity: self.capacity() })
    }

    /// Tombstones `key` so it is no longer a member
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`] if `key` is not a live member. The table is not modified.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Removed, NotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.probe(key).found.ok_or(NotFound)?;
        match self.slots.get_mut(index) {
            Some(Slot::Occupied(entry)) => {
                entry.tombstoned = true;
                self.live = self.live.saturating_sub(1);
                Ok(Removed)
            }
            _ => Err(NotFound),
        }
    }

    /// Returns true if `key` is a live member of the set
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).found.is_some()
    }

    /// Number of slots a lookup of `key` inspects before it finds the key or gives up
    #[must_use]
    pub fn probe_len<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).probes
    }

    /// Walks the probe sequence of `key`.
    ///
    /// Stops at a live match or at the first empty slot. Tombstones and other keys are
    /// stepped over, remembering the first tombstone as a reusable slot.
    fn probe<Q>(&self, key: &Q) -> ProbeOutcome
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut outcome = ProbeOutcome::default();
        for index in ProbeSequence::new(key, self.capacity()) {
            outcome.probes = outcome.probes.saturating_add(1);
            match self.slots.get(index) {
                None | Some(Slot::Empty) => {
                    outcome.empty = Some(index);
                    return outcome;
                }
                Some(Slot::Occupied(entry)) if entry.tombstoned => {
                    if outcome.reusable.is_none() {
                        outcome.reusable = Some(index);
                    }
                }
                Some(Slot::Occupied(entry)) => {
                    if entry.key.borrow() == key {
                        outcome.found = Some(index);
                        return outcome;
                    }
                }
            }
        }
        outcome
    }

    /// True once `live / capacity >= MAX_LOAD_NUMERATOR / MAX_LOAD_DENOMINATOR`
    fn at_load_limit(&self) -> bool {
        self.live.saturating_mul(Self::MAX_LOAD_DENOMINATOR) >=
            self.capacity().saturating_mul(Self::MAX_LOAD_NUMERATOR)
    }

    /// Doubles the capacity, re-probing every live key and dropping tombstones.
    ///
    /// Target slots are computed before any key moves, so on error the table is unchanged.
    fn grow(&mut self) -> Result<(), ResizeError> {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity
            .checked_mul(Self::GROWTH_FACTOR)
            .ok_or(ResizeError::CapacityOverflow { current: old_capacity })?;

        let mut taken = Vec::new();
        taken
            .try_reserve_exact(new_capacity)
            .map_err(|source| ResizeError::Allocation { requested: new_capacity, source })?;
        taken.resize(new_capacity, false);

        let mut targets = Vec::new();
        targets
            .try_reserve_exact(self.live)
            .map_err(|source| ResizeError::Allocation { requested: self.live, source })?;
        for key in self.slots.iter().filter_map(Slot::live_key) {
            let target = ProbeSequence::new(key, new_capacity)
                .find(|&index| taken.get(index).is_some_and(|used| !used))
                .ok_or(ResizeError::ProbeExhausted { capacity: new_capacity })?;
            if let Some(used) = taken.get_mut(target) {
                *used = true;
            }
            targets.push(target);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(new_capacity)
            .map_err(|source| ResizeError::Allocation { requested: new_capacity, source })?;
        slots.resize_with(new_capacity, Slot::default);

        let old_slots = mem::replace(&mut self.slots, slots);
        let reclaimed = self.occupied.saturating_sub(self.live);
        for (key, target) in old_slots.into_iter().filter_map(Slot::into_live_key).zip(targets) {
            if let Some(slot) = self.slots.get_mut(target) {
                *slot = Slot::Occupied(Entry::live(key));
            }
        }
        self.occupied = self.live;

        debug!(old_capacity, new_capacity, live = self.live, reclaimed, "resized table");
        Ok(())
    }

    /// Number of slots in the table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the set has no live keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of tombstoned slots waiting for the next resize
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.occupied.saturating_sub(self.live)
    }

    /// Returns the live load factor, `len / capacity`
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.live as f64 / self.capacity() as f64
    }

    /// Snapshot of the slot occupancy
    #[must_use]
    pub fn stats(&self) -> TableStats {
        TableStats {
            capacity: self.capacity(),
            live: self.live,
            tombstones: self.tombstones(),
            empty: self.capacity().saturating_sub(self.occupied),
        }
    }

    /// Returns an iterator over the live keys in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K> {
        Iter { slots: self.slots.iter(), remaining: self.live }
    }
}

impl<K> Extend<K> for OpenAddressingSet<K>
where
    K: Eq + Hash,
{
    fn extend<T: IntoIterator<Item = K>>(&mut self, iter: T) {
        for key in iter {
            match self.insert(key) {
                Ok(Inserted) | Err(InsertError::Duplicate(_)) => {}
                Err(err) => {
                    error!(error = %err, "stopping extend after fatal insert error");
                    return;
                }
            }
        }
    }
}

impl<K> FromIterator<K> for OpenAddressingSet<K>
where
    K: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

/// Iterator over the live keys of an [`OpenAddressingSet`]
#[derive(Debug, Clone)]
pub struct Iter<'a, K> {
    /// Remaining slots to scan
    slots: std::slice::Iter<'a, Slot<K>>,
    /// Live keys not yet yielded
    remaining: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let key = self.slots.by_ref().find_map(Slot::live_key)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
