//! Hash derivation and the double-hashing probe sequence
//!
//! Both hashes are pure functions of `(key, capacity)`: the same key always starts probing at
//! the same slot and moves by the same step for a given capacity, whatever the table holds.
//! They never use a per-process random seed.

use std::hash::{Hash, Hasher};

/// Multiplier of the polynomial behind the primary index
const PRIMARY_MULTIPLIER: u64 = 31;
/// Multiplier of the polynomial behind the probe step
const STEP_MULTIPLIER: u64 = 37;

/// Deterministic polynomial hasher.
///
/// Folds every byte written to it with Horner's rule, `state = state * m + byte`, walking each
/// byte slice from index 0 to `len - 1`. The result is passed through a 64-bit avalanche
/// finalizer so the low bits used by power-of-two masking depend on the whole key.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PolynomialHasher {
    /// Polynomial base
    multiplier: u64,
    /// Running polynomial value
    state: u64,
}

impl PolynomialHasher {
    /// Creates a hasher with the given polynomial base and a zero state
    pub(crate) const fn new(multiplier: u64) -> Self {
        Self { multiplier, state: 0 }
    }
}

impl Hasher for PolynomialHasher {
    fn finish(&self) -> u64 {
        let mut k = self.state;
        k ^= k >> 33;
        k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
        k ^= k >> 33;
        k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        k ^= k >> 33;
        k
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_mul(self.multiplier).wrapping_add(u64::from(byte));
        }
    }
}

/// Hashes `key` with the polynomial of base `multiplier`
fn polynomial_hash<Q: Hash + ?Sized>(key: &Q, multiplier: u64) -> u64 {
    let mut hasher = PolynomialHasher::new(multiplier);
    key.hash(&mut hasher);
    hasher.finish()
}

/// Mask equivalent to `mod capacity` for a power-of-two capacity
fn index_mask(capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two(), "capacity {capacity} is not a power of two");
    capacity.wrapping_sub(1)
}

/// `h1`: the first slot probed for `key`
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn primary_index<Q: Hash + ?Sized>(key: &Q, capacity: usize) -> usize {
    (polynomial_hash(key, PRIMARY_MULTIPLIER) as usize) & index_mask(capacity)
}

/// `h2`: distance between consecutive probes for `key`.
///
/// Always odd, hence coprime with the power-of-two capacity, so the sequence visits every slot
/// once before it repeats.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn probe_step<Q: Hash + ?Sized>(key: &Q, capacity: usize) -> usize {
    ((polynomial_hash(key, STEP_MULTIPLIER) as usize).wrapping_mul(2) | 1) & index_mask(capacity)
}

/// Slot indices `p, p + s, p + 2s, ...` modulo capacity, capped at `capacity` probes
#[derive(Debug, Clone)]
pub(crate) struct ProbeSequence {
    /// Index yielded by the next call to `next`
    next: usize,
    /// Probe step `h2`
    step: usize,
    /// `capacity - 1`
    mask: usize,
    /// Probes left before the bound is reached
    remaining: usize,
}

impl ProbeSequence {
    /// Starts the sequence of `key` over a table of `capacity` slots
    pub(crate) fn new<Q: Hash + ?Sized>(key: &Q, capacity: usize) -> Self {
        Self {
            next: primary_index(key, capacity),
            step: probe_step(key, capacity),
            mask: index_mask(capacity),
            remaining: capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.remaining = self.remaining.checked_sub(1)?;
        let current = self.next;
        self.next = current.wrapping_add(self.step) & self.mask;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}
