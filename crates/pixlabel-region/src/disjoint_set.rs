//! Equivalence table over provisional tags
//!
//! Tags are allocated from a monotonically increasing counter and never
//! reused. Every allocated tag `t` satisfies `parent[t] <= t`, with equality
//! exactly for class roots, so following parent links strictly decreases the
//! tag and always terminates.
//!
//! Path compression is not performed: roots are only resolved against a
//! frozen table by the reducer.

use crate::error::{RegionError, RegionResult};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed-capacity union-find over tags `1..=capacity`
#[derive(Debug, Clone)]
pub struct DisjointSet {
    /// `parent[0]` is unused; unallocated entries are 0
    parent: Vec<u32>,
    num_tags: u32,
    capacity: u32,
}

impl DisjointSet {
    /// Create an empty, zeroed table able to hold `capacity` tags.
    pub fn new(capacity: u32) -> Self {
        Self {
            parent: vec![0; capacity as usize + 1],
            num_tags: 0,
            capacity,
        }
    }

    /// Maximum number of tags.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of tags allocated so far.
    pub fn num_tags(&self) -> u32 {
        self.num_tags
    }

    /// Parent link of `tag`, 0 if unallocated.
    pub fn parent(&self, tag: u32) -> u32 {
        self.parent.get(tag as usize).copied().unwrap_or(0)
    }

    /// Whether `tag` is an allocated class root.
    pub fn is_root(&self, tag: u32) -> bool {
        tag > 0 && self.parent(tag) == tag
    }

    /// Allocate a fresh tag, its own root.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::CapacityExceeded`] once `capacity` tags exist.
    pub fn allocate(&mut self) -> RegionResult<u32> {
        if self.num_tags >= self.capacity {
            return Err(RegionError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.num_tags += 1;
        let tag = self.num_tags;
        self.parent[tag as usize] = tag;
        Ok(tag)
    }

    /// Root of the class containing `tag`.
    ///
    /// Returns `tag` itself for roots and for 0 / unallocated tags.
    pub fn find_root(&self, tag: u32) -> u32 {
        let mut tag = tag;
        loop {
            let parent = self.parent(tag);
            if parent > 0 && parent < tag {
                tag = parent;
            } else {
                return tag;
            }
        }
    }

    /// Merge the classes of `a` and `b`, returning the common root.
    ///
    /// The larger root is attached under the smaller one. Unallocated tags
    /// (0) are never linked.
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let root_a = self.find_root(a);
        let root_b = self.find_root(b);
        let (low, high) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        if low == high || low == 0 {
            return high;
        }
        self.parent[high as usize] = low;
        low
    }

    /// Check `0 < parent[t] <= t` for every allocated tag.
    pub fn check_invariant(&self) -> bool {
        (1..=self.num_tags).all(|t| {
            let parent = self.parent(t);
            parent > 0 && parent <= t
        })
    }

    /// Number of distinct classes.
    pub fn num_roots(&self) -> u32 {
        (1..=self.num_tags).filter(|&t| self.is_root(t)).count() as u32
    }
}

/// A [`DisjointSet`] shared between labeling workers.
///
/// Every mutation happens under one lock; tag allocation and unions from
/// different workers are therefore serialized.
#[derive(Debug)]
pub struct SharedDisjointSet {
    inner: Mutex<DisjointSet>,
}

impl SharedDisjointSet {
    /// Create an empty shared table able to hold `capacity` tags.
    pub fn new(capacity: u32) -> Self {
        Self {
            inner: Mutex::new(DisjointSet::new(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisjointSet> {
        // a poisoned lock means a worker already panicked; the panic propagates
        // through the pool, so the table contents are irrelevant
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate a fresh tag.
    pub fn allocate(&self) -> RegionResult<u32> {
        self.lock().allocate()
    }

    /// Merge `tag` with each of `others` in one critical section.
    pub fn union_all(&self, tag: u32, others: &[u32]) {
        let mut table = self.lock();
        for &other in others {
            table.union(tag, other);
        }
    }

    /// Merge every pair in one critical section.
    pub fn union_pairs(&self, pairs: &[(u32, u32)]) {
        if pairs.is_empty() {
            return;
        }
        let mut table = self.lock();
        for &(a, b) in pairs {
            table.union(a, b);
        }
    }

    /// Number of tags allocated so far.
    pub fn num_tags(&self) -> u32 {
        self.lock().num_tags()
    }

    /// Freeze the table once all workers are done.
    pub fn into_inner(self) -> DisjointSet {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sequence() {
        let mut set = DisjointSet::new(3);
        assert_eq!(set.allocate().unwrap(), 1);
        assert_eq!(set.allocate().unwrap(), 2);
        assert_eq!(set.allocate().unwrap(), 3);
        assert!(matches!(
            set.allocate(),
            Err(RegionError::CapacityExceeded { capacity: 3 })
        ));
        assert_eq!(set.num_tags(), 3);
        assert!(set.is_root(2));
    }

    #[test]
    fn test_find_root_of_unallocated() {
        let set = DisjointSet::new(4);
        assert_eq!(set.find_root(0), 0);
        assert_eq!(set.find_root(3), 3);
        assert_eq!(set.find_root(99), 99);
    }

    #[test]
    fn test_union_attaches_larger_root() {
        let mut set = DisjointSet::new(8);
        for _ in 0..5 {
            set.allocate().unwrap();
        }
        assert_eq!(set.union(5, 3), 3);
        assert_eq!(set.parent(5), 3);
        assert_eq!(set.union(4, 5), 3);
        assert_eq!(set.parent(4), 3);
        assert_eq!(set.union(2, 4), 2);
        assert_eq!(set.find_root(5), 2);
        assert_eq!(set.find_root(4), 2);
        assert_eq!(set.num_roots(), 2);
        assert!(set.check_invariant());
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut set = DisjointSet::new(4);
        set.allocate().unwrap();
        set.allocate().unwrap();
        set.union(1, 2);
        let before = set.clone();
        assert_eq!(set.union(2, 1), 1);
        assert_eq!(set.union(2, 2), 1);
        assert_eq!(set.parent, before.parent);
    }

    #[test]
    fn test_union_ignores_unallocated() {
        let mut set = DisjointSet::new(4);
        set.allocate().unwrap();
        assert_eq!(set.union(1, 0), 1);
        assert_eq!(set.parent(0), 0);
        assert!(set.check_invariant());
    }

    #[test]
    fn test_shared_table_across_threads() {
        let shared = SharedDisjointSet::new(1000);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let mut prev = shared.allocate().unwrap();
                    for _ in 0..99 {
                        let tag = shared.allocate().unwrap();
                        shared.union_all(tag, &[prev]);
                        prev = tag;
                    }
                });
            }
        });
        let set = shared.into_inner();
        assert_eq!(set.num_tags(), 400);
        assert_eq!(set.num_roots(), 4);
        assert!(set.check_invariant());
    }
}
