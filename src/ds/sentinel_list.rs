//! Doubly linked list over a fixed slot range, linked by index.
//!
//! Stores `(prev, next)` pairs of 1-based slot indices in one flat array,
//! with index 0 acting as a sentinel that closes the ring: the sentinel's
//! `next` is the head (MRU end) and its `prev` is the tail (LRU end).
//!
//! ## Architecture
//!
//! ```text
//!   links: Vec<[u16; 2]>          ([PREV, NEXT] per slot)
//!
//!   index:   0 (sentinel)   1       2       3
//!          [tail, head]   [p,n]   [p,n]   [p,n]
//!
//!   head ──► [3] ◄──► [1] ◄──► [2] ◄── tail
//!   (sentinel.next)              (sentinel.prev)
//! ```
//!
//! Because the sentinel participates in the ring, attach and detach are
//! unconditional splices: an empty list is just the sentinel linked to
//! itself, so no branch is needed for boundary cases.
//!
//! ## Operations
//! - `attach_head(slot)` / `attach_tail(slot)`: splice an unlinked slot in
//! - `move_to_head(slot)` / `move_to_tail(slot)`: detach + splice; no-ops
//!   when the slot is already at the requested end
//! - `iter()`: head-to-tail slot indices
//!
//! All operations are O(1) except iteration. The list stores no values;
//! callers own the parallel slot storage and guarantee that every slot
//! passed in is inside the capacity fixed at construction.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

const PREV: usize = 0;
const NEXT: usize = 1;

/// Index-linked list with a sentinel at slot 0.
#[derive(Debug)]
pub struct SentinelList {
    links: Vec<[u16; 2]>,
}

impl SentinelList {
    /// Creates a list able to link slots `1..=capacity`, all unlinked.
    pub fn new(capacity: u16) -> Self {
        Self {
            links: vec![[0, 0]; capacity as usize + 1],
        }
    }

    /// Returns the head (MRU) slot, or 0 if the list is empty.
    #[inline]
    pub fn head(&self) -> u16 {
        self.links[0][NEXT]
    }

    /// Returns the tail (LRU) slot, or 0 if the list is empty.
    #[inline]
    pub fn tail(&self) -> u16 {
        self.links[0][PREV]
    }

    /// Returns the slot after `slot` (towards the tail), or 0 at the end.
    #[inline]
    pub fn next(&self, slot: u16) -> u16 {
        self.links[slot as usize][NEXT]
    }

    /// Returns the slot before `slot` (towards the head), or 0 at the front.
    #[inline]
    pub fn prev(&self, slot: u16) -> u16 {
        self.links[slot as usize][PREV]
    }

    /// Splices an unlinked slot in at the head.
    pub fn attach_head(&mut self, slot: u16) {
        debug_assert_ne!(slot, 0);
        let head = self.links[0][NEXT];
        self.links[slot as usize] = [0, head];
        self.links[head as usize][PREV] = slot;
        self.links[0][NEXT] = slot;
    }

    /// Splices an unlinked slot in at the tail.
    pub fn attach_tail(&mut self, slot: u16) {
        debug_assert_ne!(slot, 0);
        let tail = self.links[0][PREV];
        self.links[slot as usize] = [tail, 0];
        self.links[tail as usize][NEXT] = slot;
        self.links[0][PREV] = slot;
    }

    /// Moves a linked slot to the head; no-op if already there.
    pub fn move_to_head(&mut self, slot: u16) {
        if self.links[0][NEXT] == slot {
            return;
        }
        self.detach(slot);
        self.attach_head(slot);
    }

    /// Moves a linked slot to the tail; no-op if already there.
    pub fn move_to_tail(&mut self, slot: u16) {
        if self.links[0][PREV] == slot {
            return;
        }
        self.detach(slot);
        self.attach_tail(slot);
    }

    fn detach(&mut self, slot: u16) {
        debug_assert_ne!(slot, 0);
        let [prev, next] = self.links[slot as usize];
        self.links[prev as usize][NEXT] = next;
        self.links[next as usize][PREV] = prev;
    }

    /// Iterates slot indices from head to tail.
    pub fn iter(&self) -> SentinelListIter<'_> {
        SentinelListIter {
            list: self,
            current: self.head(),
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self, expected_len: usize) {
        let capacity = self.links.len() - 1;
        assert!(expected_len <= capacity);

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut prev = 0u16;
        let mut current = self.head();
        while current != 0 {
            assert!((current as usize) <= capacity);
            assert!(seen.insert(current), "slot {current} visited twice");
            assert_eq!(self.links[current as usize][PREV], prev);
            prev = current;
            current = self.links[current as usize][NEXT];
            count += 1;
            assert!(count <= capacity);
        }
        assert_eq!(self.tail(), prev);
        assert_eq!(count, expected_len);

        // The reverse walk must visit the same slots.
        let mut back_count = 0usize;
        let mut current = self.tail();
        while current != 0 {
            assert!(seen.contains(&current));
            current = self.links[current as usize][PREV];
            back_count += 1;
            assert!(back_count <= capacity);
        }
        assert_eq!(back_count, expected_len);
    }
}

pub struct SentinelListIter<'a> {
    list: &'a SentinelList,
    current: u16,
}

impl Iterator for SentinelListIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == 0 {
            return None;
        }
        let slot = self.current;
        self.current = self.list.next(slot);
        Some(slot)
    }
}
