//! Set-Associative Cache Model.
//!
//! This module implements one set-associative cache: the line store, the
//! per-set recency lists, and the access engine that applies the write and
//! allocation policies. It models residency and dirtiness only; no block
//! contents are stored.
//!
//! Statistics are not kept here. Every access returns an [`AccessOutcome`]
//! and the caller folds it into the per-stream counters.

/// Per-set LRU recency list.
pub mod lru;

use tracing::trace;

use self::lru::RecencyList;
use crate::common::{AccessType, AddressLayout, CacheKind, ConfigError};
use crate::config::{AllocationPolicy, CacheGeometry, WritePolicy};

/// Cache line entry containing tag, validity, and dirty bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Upper address bits of the resident block; meaningful only when `valid`.
    pub tag: u64,
    /// Whether the line holds a block.
    pub valid: bool,
    /// Written since it was loaded and not yet copied back (write-back only).
    pub dirty: bool,
}

/// One set: `associativity` lines plus their recency order.
#[derive(Clone, Debug)]
struct CacheSet {
    lines: Vec<CacheLine>,
    recency: RecencyList,
}

impl CacheSet {
    fn new(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways],
            recency: RecencyList::new(ways),
        }
    }

    fn lookup(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|l| l.valid && l.tag == tag)
    }
}

/// A block displaced to make room for a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    /// First byte address of the evicted block.
    pub block_addr: u64,
    /// Whether the victim had to be copied back.
    pub dirty: bool,
}

/// Result of a single access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessOutcome {
    /// The block was resident.
    pub hit: bool,
    /// A miss installed the block.
    pub installed: bool,
    /// Valid block replaced by the installation, if any.
    pub evicted: Option<Eviction>,
    /// Words written to backing storage by this access.
    pub words_copied_back: u64,
}

/// Dirty state settled by [`CacheSim::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Number of dirty lines written back.
    pub dirty_lines: u64,
    /// Words written to backing storage.
    pub words_copied_back: u64,
}

/// Cache simulator implementing one set-associative cache with LRU replacement.
///
/// Built from a validated [`CacheGeometry`]; the address layout, set count,
/// and policies are fixed for the lifetime of the instance.
#[derive(Clone, Debug)]
pub struct CacheSim {
    kind: CacheKind,
    sets: Vec<CacheSet>,
    layout: AddressLayout,
    ways: usize,
    words_per_block: u64,
    write_policy: WritePolicy,
    allocation_policy: AllocationPolicy,
}

impl CacheSim {
    /// Creates a cold cache: every line invalid and clean.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Size, block size, and associativity of this cache
    /// * `write_policy` - Write-back or write-through
    /// * `allocation_policy` - Write-allocate or no-write-allocate
    /// * `words_per_block` - Words copied back for one dirty block
    pub fn new(
        geometry: &CacheGeometry,
        write_policy: WritePolicy,
        allocation_policy: AllocationPolicy,
        words_per_block: u64,
    ) -> Result<Self, ConfigError> {
        let num_sets = geometry.validate()?;
        let layout = AddressLayout::new(geometry.block_size, num_sets).ok_or(
            ConfigError::SetCountNotPowerOfTwo {
                cache: geometry.kind,
                sets: num_sets,
            },
        )?;
        let ways = geometry.associativity as usize;

        tracing::debug!(
            cache = %geometry.kind,
            sets = num_sets,
            ways,
            offset_bits = layout.offset_bits(),
            index_bits = layout.index_bits(),
            "building cache"
        );

        Ok(Self {
            kind: geometry.kind,
            sets: (0..num_sets).map(|_| CacheSet::new(ways)).collect(),
            layout,
            ways,
            words_per_block,
            write_policy,
            allocation_policy,
        })
    }

    /// Which cache this is.
    pub const fn kind(&self) -> CacheKind {
        self.kind
    }

    /// Number of sets.
    pub fn num_sets(&self) -> usize {
        self.sets.len()
    }

    /// Lines per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Address layout used for decoding.
    pub const fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    /// Checks if the cache holds the block containing `addr`.
    pub fn contains(&self, addr: u64) -> bool {
        let fields = self.layout.decode(addr);
        self.sets[fields.index].lookup(fields.tag).is_some()
    }

    /// Returns the dirty bit of the block containing `addr`, or `None` if it is not resident.
    pub fn is_dirty(&self, addr: u64) -> Option<bool> {
        let fields = self.layout.decode(addr);
        let set = &self.sets[fields.index];
        set.lookup(fields.tag).map(|way| set.lines[way].dirty)
    }

    /// Tags of the valid lines of set `index`, in slot order.
    ///
    /// Returns an empty vector for an out-of-range index.
    pub fn resident_tags(&self, index: usize) -> Vec<u64> {
        self.sets.get(index).map_or_else(Vec::new, |set| {
            set.lines
                .iter()
                .filter(|l| l.valid)
                .map(|l| l.tag)
                .collect()
        })
    }

    /// Tags of the valid lines of set `index`, from most to least recently used.
    pub fn recency_order(&self, index: usize) -> Vec<u64> {
        self.sets.get(index).map_or_else(Vec::new, |set| {
            set.recency
                .iter()
                .map(|way| set.lines[way])
                .filter(|l| l.valid)
                .map(|l| l.tag)
                .collect()
        })
    }

    /// Number of dirty lines across all sets.
    pub fn dirty_lines(&self) -> usize {
        self.sets
            .iter()
            .flat_map(|s| s.lines.iter())
            .filter(|l| l.dirty)
            .count()
    }

    /// Accesses the cache for the specified address.
    ///
    /// On a hit the line becomes MRU and, for a write under write-back, dirty.
    /// On a miss the LRU line of the set is replaced unless the access is a
    /// data access under no-write-allocate, in which case the set is left
    /// untouched. Instruction fetches always allocate.
    ///
    /// # Arguments
    ///
    /// * `addr` - Byte address
    /// * `access` - Read, write, or instruction fetch
    pub fn access(&mut self, addr: u64, access: AccessType) -> AccessOutcome {
        let fields = self.layout.decode(addr);
        let is_write = access.is_write();
        let write_through = is_write && self.write_policy == WritePolicy::WriteThrough;
        let set = &mut self.sets[fields.index];

        if let Some(way) = set.lookup(fields.tag) {
            if is_write && self.write_policy == WritePolicy::WriteBack {
                set.lines[way].dirty = true;
            }
            set.recency.touch(way);
            trace!(cache = %self.kind, addr, set = fields.index, way, "hit");
            return AccessOutcome {
                hit: true,
                installed: false,
                evicted: None,
                words_copied_back: u64::from(write_through),
            };
        }

        let allocate = access == AccessType::Fetch
            || self.allocation_policy == AllocationPolicy::WriteAllocate;
        if !allocate {
            trace!(cache = %self.kind, addr, set = fields.index, "miss, bypassed");
            return AccessOutcome {
                hit: false,
                installed: false,
                evicted: None,
                words_copied_back: u64::from(is_write),
            };
        }

        let Some(victim) = set.recency.lru() else {
            return AccessOutcome::default();
        };
        let old = set.lines[victim];
        let evicted = old.valid.then(|| Eviction {
            block_addr: self.layout.block_addr(old.tag, fields.index),
            dirty: old.dirty,
        });

        set.lines[victim] = CacheLine {
            tag: fields.tag,
            valid: true,
            dirty: false,
        };
        set.recency.touch(victim);

        let mut words = u64::from(write_through);
        if let Some(ev) = evicted {
            trace!(cache = %self.kind, victim = ev.block_addr, dirty = ev.dirty, "evict");
            if ev.dirty {
                words += self.words_per_block;
            }
        }
        trace!(cache = %self.kind, addr, set = fields.index, way = victim, "miss, installed");

        AccessOutcome {
            hit: false,
            installed: true,
            evicted,
            words_copied_back: words,
        }
    }

    /// Writes back every dirty line and clears its dirty bit.
    ///
    /// Residency is preserved; the caller decides whether to drop the cache.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        for line in self.sets.iter_mut().flat_map(|s| s.lines.iter_mut()) {
            if line.dirty {
                line.dirty = false;
                report.dirty_lines += 1;
                report.words_copied_back += self.words_per_block;
            }
        }
        report
    }
}
