//! Least Recently Used (LRU) Recency List.
//!
//! Each cache set owns one `RecencyList`: a doubly-linked list threaded
//! through a fixed arena of links, one per way. Links are way indices rather
//! than pointers, so a list can never dangle into another set.
//!
//! The head is the Most Recently Used way and the tail the Least Recently
//! Used one. Explicit head and tail references are maintained on every
//! operation, so victim selection never walks the list.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `detach()`, `insert_at_head()`, `touch()`: O(1)
//!   - `lru()` / `mru()`: O(1)
//! - **Space Complexity:** O(W) per set, where W is the associativity

/// Neighbour links of one way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Link {
    prev: Option<usize>,
    next: Option<usize>,
    linked: bool,
}

/// Recency order of the ways of one set.
#[derive(Clone, Debug)]
pub struct RecencyList {
    links: Vec<Link>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl RecencyList {
    /// Creates a list holding ways `0..ways` in slot order.
    ///
    /// Way 0 starts as the MRU and way `ways - 1` as the LRU, so a cold set
    /// is filled from its last slot backwards.
    pub fn new(ways: usize) -> Self {
        let mut list = Self {
            links: vec![Link::default(); ways],
            head: None,
            tail: None,
        };
        for way in (0..ways).rev() {
            list.insert_at_head(way);
        }
        list
    }

    /// Number of ways in the arena.
    pub fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Number of ways currently linked.
    pub fn len(&self) -> usize {
        self.links.iter().filter(|l| l.linked).count()
    }

    /// Returns `true` if no way is linked.
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Most recently used way.
    #[inline]
    pub const fn mru(&self) -> Option<usize> {
        self.head
    }

    /// Least recently used way, the next eviction victim.
    #[inline]
    pub const fn lru(&self) -> Option<usize> {
        self.tail
    }

    /// Returns `true` if `way` is currently a member of the list.
    pub fn contains(&self, way: usize) -> bool {
        self.links.get(way).is_some_and(|l| l.linked)
    }

    /// Unlinks `way`, repairing head and tail if it sat at either end.
    ///
    /// Detaching a way that is not linked is a no-op.
    pub fn detach(&mut self, way: usize) {
        let Some(link) = self.links.get(way).copied() else {
            return;
        };
        if !link.linked {
            return;
        }

        match link.prev {
            Some(prev) => self.links[prev].next = link.next,
            None => self.head = link.next,
        }
        match link.next {
            Some(next) => self.links[next].prev = link.prev,
            None => self.tail = link.prev,
        }
        self.links[way] = Link::default();
    }

    /// Links `way` at the MRU end.
    ///
    /// A way that is already linked is moved rather than duplicated.
    pub fn insert_at_head(&mut self, way: usize) {
        if way >= self.links.len() {
            return;
        }
        if self.links[way].linked {
            self.detach(way);
        }

        self.links[way] = Link {
            prev: None,
            next: self.head,
            linked: true,
        };
        match self.head {
            Some(old) => self.links[old].prev = Some(way),
            None => self.tail = Some(way),
        }
        self.head = Some(way);
    }

    /// Marks `way` as most recently used.
    #[inline]
    pub fn touch(&mut self, way: usize) {
        if self.head != Some(way) {
            self.insert_at_head(way);
        }
    }

    /// Iterates ways from MRU to LRU.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.head, move |&way| self.links[way].next)
    }
}
