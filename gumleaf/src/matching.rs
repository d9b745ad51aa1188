//! Identity matching between two flattened forests.
//!
//! Two phases:
//! 1. Pairing: entries with equal ids are paired, regardless of where they sit
//! 2. Stable run: the longest common subsequence of the paired entries
//!
//! Ids are unique within a flattening, so the longest common subsequence of
//! the two keyed sequences is the longest increasing subsequence of old
//! positions read in new order. That runs in O(n log n) instead of the
//! quadratic table a general LCS needs.

use crate::{debug, trace};

use crate::entry::Entry;
use core::hash::Hash;
use rapidhash::RapidHashMap as HashMap;

/// A bidirectional mapping between positions in the old and new flattenings.
/// Uses Vec for O(1) lookups indexed by flat position.
#[derive(Debug, Clone, Default)]
pub struct Matching {
    /// Map from old position to new position
    old_to_new: Vec<Option<usize>>,
    /// Map from new position to old position
    new_to_old: Vec<Option<usize>>,
    /// All matched pairs, in insertion order
    pairs: Vec<(usize, usize)>,
}

impl Matching {
    /// Create a new empty matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new matching with preallocated capacity.
    pub fn with_capacity(old_len: usize, new_len: usize) -> Self {
        Self {
            old_to_new: vec![None; old_len],
            new_to_old: vec![None; new_len],
            pairs: Vec::with_capacity(old_len.min(new_len)),
        }
    }

    /// Add a match between two positions.
    #[inline]
    pub fn add(&mut self, old: usize, new: usize) {
        if old >= self.old_to_new.len() {
            self.old_to_new.resize(old + 1, None);
        }
        if new >= self.new_to_old.len() {
            self.new_to_old.resize(new + 1, None);
        }

        self.old_to_new[old] = Some(new);
        self.new_to_old[new] = Some(old);
        self.pairs.push((old, new));
    }

    /// Check if an old position is matched.
    #[inline(always)]
    pub fn contains_old(&self, old: usize) -> bool {
        self.old_to_new.get(old).is_some_and(|m| m.is_some())
    }

    /// Check if a new position is matched.
    #[inline(always)]
    pub fn contains_new(&self, new: usize) -> bool {
        self.new_to_old.get(new).is_some_and(|m| m.is_some())
    }

    /// Get the new position matched to an old one.
    #[inline(always)]
    pub fn get_new(&self, old: usize) -> Option<usize> {
        self.old_to_new.get(old).copied().flatten()
    }

    /// Get the old position matched to a new one.
    #[inline(always)]
    pub fn get_old(&self, new: usize) -> Option<usize> {
        self.new_to_old.get(new).copied().flatten()
    }

    /// Get all matched `(old, new)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    /// Get the number of matched pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if there are no matches.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Pair every new entry with the old entry carrying the same id.
///
/// Pairs are added in new order.
pub fn match_entries<K>(old: &[Entry<K>], new: &[Entry<K>]) -> Matching
where
    K: Eq + Hash,
{
    debug!(old = old.len(), new = new.len(), "match_entries start");

    let mut by_id: HashMap<&K, usize> = HashMap::default();
    by_id.reserve(old.len());
    for (i, entry) in old.iter().enumerate() {
        by_id.insert(&entry.id, i);
    }

    let mut matching = Matching::with_capacity(old.len(), new.len());
    for (j, entry) in new.iter().enumerate() {
        if let Some(&i) = by_id.get(&entry.id) {
            matching.add(i, j);
        }
    }

    debug!(matched = matching.len(), "match_entries done");
    matching
}

/// Longest common subsequence of matched `(old, new)` pairs: the longest
/// chain increasing in both coordinates.
///
/// Ties between equally long chains are broken deterministically.
pub fn longest_common_subsequence(
    pairs: impl IntoIterator<Item = (usize, usize)>,
) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
    pairs.sort_unstable_by_key(|&(_, new)| new);

    // tails[k] = index into `pairs` of the smallest old position ending an
    // increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; pairs.len()];

    for (k, &(old, _)) in pairs.iter().enumerate() {
        let slot = tails.partition_point(|&t| pairs[t].0 < old);
        if slot > 0 {
            prev[k] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(k);
        } else {
            tails[slot] = k;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(k) = cursor {
        run.push(pairs[k]);
        cursor = prev[k];
    }
    run.reverse();

    trace!(matched = pairs.len(), stable = run.len(), "lcs computed");
    run
}
