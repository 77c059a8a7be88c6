use std::cmp::Ordering;

use slab::Slab;

use crate::segment::Segment;
use crate::tolerance::Tolerance;

/// Order two active segments at sweep position `x`.
///
/// The primary key is the y at which each segment crosses the sweep
/// line; the order is therefore position-dependent and only meaningful
/// while both segments are active. Ties (segments passing through the
/// same point at `x`) are broken by slope, which is the order the
/// segments take immediately after the shared point — the vertical
/// sentinel sorts highest — and then by the canonical endpoints, left
/// before right. The endpoint tie-breaks fire only for collinear
/// segments sharing a point at `x`; those pairs are ordered here and
/// rejected as overlapping when their crossing is tested.
///
/// Panics on a full tie: distinct segments always differ in one of the
/// keys, so a tie means a duplicate slipped past input validation and
/// the active order is no longer well-defined.
pub(crate) fn compare_at(a: &Segment, b: &Segment, x: f64, tol: &Tolerance) -> Ordering {
    let ord = tol
        .cmp(a.y_at(x), b.y_at(x))
        .then_with(|| tol.cmp(a.slope(), b.slope()))
        .then_with(|| a.left().cmp(&b.left()))
        .then_with(|| a.right().cmp(&b.right()));
    if ord == Ordering::Equal {
        panic!(
            "active segments are indistinguishable at x={}: {:?} <=> {:?}",
            x, a, b
        );
    }
    ord
}

/// The sweep's status structure: active segment keys in ascending
/// y-order at the current sweep position.
///
/// Backed by a plain vector of slab keys. Insertion binary-searches
/// under [`compare_at`]; removal and neighbor queries address segments
/// by key and index, so they stay exact even while an unprocessed
/// crossing leaves a tied block in pre-crossing arrangement. Reordering
/// across a crossing is an in-place re-sort of the tied block.
#[derive(Debug, Default)]
pub(crate) struct ActiveList {
    keys: Vec<usize>,
}

impl ActiveList {
    /// Insert an active segment, returning its index.
    pub fn insert(&mut self, key: usize, storage: &Slab<Segment>, x: f64, tol: &Tolerance) -> usize {
        let segment = &storage[key];
        let idx = match self
            .keys
            .binary_search_by(|&k| compare_at(&storage[k], segment, x, tol))
        {
            Ok(i) | Err(i) => i,
        };
        self.keys.insert(idx, key);
        idx
    }

    /// Remove a segment by key, returning the index it held.
    pub fn remove(&mut self, key: usize) -> Option<usize> {
        let idx = self.index_of(key)?;
        self.keys.remove(idx);
        Some(idx)
    }

    pub fn index_of(&self, key: usize) -> Option<usize> {
        self.keys.iter().position(|&k| k == key)
    }

    pub fn get(&self, idx: usize) -> Option<usize> {
        self.keys.get(idx).copied()
    }

    /// Key of the neighbor below the given index.
    pub fn below(&self, idx: usize) -> Option<usize> {
        idx.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Key of the neighbor above the given index.
    pub fn above(&self, idx: usize) -> Option<usize> {
        self.get(idx + 1)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.keys.iter().copied()
    }

    /// Re-order the block of segments passing through `(x, y)` so that
    /// the stored order agrees with [`compare_at`] there.
    ///
    /// As the sweep passes a crossing point the ranks of everything
    /// through it reverse; since the comparator's slope tie-break is
    /// exactly the after-the-point order, sorting the tied block applies
    /// the reversal. The sort is idempotent, so repeated crossing events
    /// at one point (one per concurrent pair) are harmless.
    pub fn reorder_through(&mut self, x: f64, y: f64, storage: &Slab<Segment>, tol: &Tolerance) {
        let start = match self
            .keys
            .iter()
            .position(|&k| tol.eq(storage[k].y_at(x), y))
        {
            Some(i) => i,
            None => return,
        };
        let len = self.keys[start..]
            .iter()
            .take_while(|&&k| tol.eq(storage[k].y_at(x), y))
            .count();
        self.keys[start..start + len]
            .sort_by(|&p, &q| compare_at(&storage[p], &storage[q], x, tol));
    }

    /// Validate the positional ordering invariant: y non-decreasing at
    /// the current sweep position. A violation is a comparator bug, not
    /// a data problem; continuing would silently produce wrong answers.
    pub fn assert_order(&self, storage: &Slab<Segment>, x: f64, tol: &Tolerance) {
        for pair in self.keys.windows(2) {
            let (a, b) = (&storage[pair[0]], &storage[pair[1]]);
            assert!(
                tol.cmp(a.y_at(x), b.y_at(x)) != Ordering::Greater,
                "active order corrupted at x={}: {:?} above {:?}",
                x,
                b,
                a
            );
        }
    }
}
