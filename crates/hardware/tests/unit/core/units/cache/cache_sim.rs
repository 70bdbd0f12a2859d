//! Cache Simulator (CacheSim) Unit Tests.
//!
//! Verifies the set-associative cache model: hit/miss logic, true LRU
//! replacement, dirty tracking under write-back and write-through, the
//! allocation policies, and flushing.
//!
//! The CacheSim is constructed directly from a CacheGeometry; no simulator needed.

use cachesim_core::common::{AccessType, CacheKind};
use cachesim_core::config::{AllocationPolicy, CacheGeometry, WritePolicy};
use cachesim_core::core::units::cache::{CacheSim, Eviction, FlushReport};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ──────────────────────────────────────────────────────────
// Helper: build a simple test cache
// ──────────────────────────────────────────────────────────

/// Creates the reference test cache.
///
/// 1024 bytes, 32-byte lines, 2-way set-associative:
///   - num_lines = 1024 / 32 = 32
///   - num_sets  = 32 / 2 = 16
///
/// Set index = (addr >> 5) & 0xF
/// Tag       = addr >> 9
fn geometry(ways: u64) -> CacheGeometry {
    CacheGeometry {
        kind: CacheKind::Unified,
        size_bytes: 1024,
        block_size: 32,
        associativity: ways,
    }
}

fn cache(write: WritePolicy, alloc: AllocationPolicy) -> CacheSim {
    CacheSim::new(&geometry(2), write, alloc, 8).unwrap()
}

fn write_back() -> CacheSim {
    cache(WritePolicy::WriteBack, AllocationPolicy::WriteAllocate)
}

/// Address `n` blocks apart from 0 within set 0 (stride = 16 sets * 32 bytes).
const fn set0(n: u64) -> u64 {
    n * 0x200
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn new_cache_geometry() {
    let c = write_back();
    assert_eq!(c.num_sets(), 16);
    assert_eq!(c.ways(), 2);
    assert_eq!(c.kind(), CacheKind::Unified);
    assert_eq!(c.layout().index_mask(), 15);
    assert!((0..16).all(|i| c.resident_tags(i).is_empty()));
    assert_eq!(c.dirty_lines(), 0);
}

#[test]
fn new_rejects_bad_geometry() {
    let bad = CacheGeometry {
        kind: CacheKind::Data,
        size_bytes: 1000,
        block_size: 32,
        associativity: 2,
    };
    assert!(CacheSim::new(&bad, WritePolicy::WriteBack, AllocationPolicy::WriteAllocate, 8).is_err());
}

// ══════════════════════════════════════════════════════════
// 2. Cold Miss / Warm Hit
// ══════════════════════════════════════════════════════════

/// A cold zero tag must not look like a resident block at address 0.
#[test]
fn cold_miss_at_address_zero() {
    let mut c = write_back();
    let outcome = c.access(0x0000, AccessType::Read);
    assert!(!outcome.hit);
    assert!(outcome.installed);
    assert_eq!(outcome.evicted, None);
    assert_eq!(outcome.words_copied_back, 0);
}

#[test]
fn warm_hit() {
    let mut c = write_back();
    let _ = c.access(0x0000, AccessType::Read);
    let outcome = c.access(0x0000, AccessType::Read);
    assert!(outcome.hit);
    assert!(!outcome.installed);
}

#[test]
fn same_line_different_offset_hits() {
    let mut c = write_back();
    let _ = c.access(0x1000, AccessType::Read);
    assert!(c.access(0x1000 + 31, AccessType::Read).hit);
    assert!(!c.access(0x1000 + 32, AccessType::Read).hit);
}

// ══════════════════════════════════════════════════════════
// 3. LRU Replacement
// ══════════════════════════════════════════════════════════

/// Scenario: 0x0000 miss, 0x0000 hit, 0x0200 miss without eviction,
/// third tag evicts the LRU line.
#[test]
fn scenario_two_way_set() {
    let mut c = write_back();
    assert!(!c.access(0x0000, AccessType::Read).hit);
    assert!(c.access(0x0000, AccessType::Read).hit);

    let second = c.access(0x0200, AccessType::Read);
    assert!(!second.hit);
    assert_eq!(second.evicted, None);
    assert!(c.contains(0x0000));
    assert!(c.contains(0x0200));

    // 0x0000 is now LRU.
    let third = c.access(0x0400, AccessType::Read);
    assert!(!third.hit);
    assert_eq!(
        third.evicted,
        Some(Eviction {
            block_addr: 0x0000,
            dirty: false
        })
    );
    assert!(!c.contains(0x0000));
    assert!(c.contains(0x0200));
    assert!(c.contains(0x0400));
}

/// Re-touching the older line changes which one is evicted.
#[test]
fn hit_refreshes_recency() {
    let mut c = write_back();
    let _ = c.access(set0(0), AccessType::Read);
    let _ = c.access(set0(1), AccessType::Read);
    assert!(c.access(set0(0), AccessType::Read).hit);

    let outcome = c.access(set0(2), AccessType::Read);
    assert_eq!(outcome.evicted.map(|e| e.block_addr), Some(set0(1)));
    assert!(c.contains(set0(0)));
    assert!(!c.contains(set0(1)));
}

/// Not "always slot 0": with 4 ways the victim follows recency, not position.
#[test]
fn eviction_follows_recency_not_slot() {
    let mut c = CacheSim::new(&geometry(4), WritePolicy::WriteBack, AllocationPolicy::WriteAllocate, 8)
        .unwrap();
    // 8 sets of 4 ways; set-0 stride is 8 * 32 = 0x100.
    let addr = |n: u64| n * 0x100;
    for n in 0..4 {
        let _ = c.access(addr(n), AccessType::Read);
    }
    // Touch in order 2, 0, 3: LRU becomes 1.
    for n in [2, 0, 3] {
        assert!(c.access(addr(n), AccessType::Read).hit);
    }
    assert_eq!(c.recency_order(0), vec![3, 0, 2, 1]);

    let outcome = c.access(addr(4), AccessType::Read);
    assert_eq!(outcome.evicted.map(|e| e.block_addr), Some(addr(1)));
    assert_eq!(c.recency_order(0), vec![4, 3, 0, 2]);
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn associativity_plus_one_evicts_first(#[case] ways: u64) {
    let mut c = CacheSim::new(&geometry(ways), WritePolicy::WriteBack, AllocationPolicy::WriteAllocate, 8)
        .unwrap();
    let stride = c.num_sets() as u64 * 32;
    let addrs: Vec<u64> = (0..=ways).map(|n| n * stride).collect();
    for &a in &addrs {
        assert!(!c.access(a, AccessType::Read).hit);
    }
    assert!(!c.contains(addrs[0]));
    for &a in &addrs[1..] {
        assert!(c.contains(a));
    }
}

#[test]
fn other_sets_are_unaffected() {
    let mut c = write_back();
    let _ = c.access(0x0020, AccessType::Read); // set 1
    for n in 0..4 {
        let _ = c.access(set0(n), AccessType::Read);
    }
    assert!(c.contains(0x0020));
    assert_eq!(c.resident_tags(1), vec![0]);
}

// ══════════════════════════════════════════════════════════
// 4. Write Policies
// ══════════════════════════════════════════════════════════

#[test]
fn write_back_hit_sets_dirty() {
    let mut c = write_back();
    let _ = c.access(0x40, AccessType::Read);
    assert_eq!(c.is_dirty(0x40), Some(false));
    let outcome = c.access(0x40, AccessType::Write);
    assert!(outcome.hit);
    assert_eq!(outcome.words_copied_back, 0);
    assert_eq!(c.is_dirty(0x40), Some(true));
}

#[test]
fn write_through_hit_never_dirty() {
    let mut c = cache(WritePolicy::WriteThrough, AllocationPolicy::WriteAllocate);
    let _ = c.access(0x40, AccessType::Read);
    let outcome = c.access(0x40, AccessType::Write);
    assert!(outcome.hit);
    assert_eq!(outcome.words_copied_back, 1);
    assert_eq!(c.is_dirty(0x40), Some(false));
    assert_eq!(c.dirty_lines(), 0);
}

/// A freshly installed line is clean, even when the miss was a write.
#[test]
fn write_allocate_miss_installs_clean_line() {
    let mut c = write_back();
    let outcome = c.access(0x80, AccessType::Write);
    assert!(!outcome.hit);
    assert!(outcome.installed);
    assert_eq!(c.is_dirty(0x80), Some(false));
}

#[test]
fn dirty_victim_is_copied_back() {
    let mut c = write_back();
    let _ = c.access(set0(0), AccessType::Read);
    let _ = c.access(set0(0), AccessType::Write);
    let _ = c.access(set0(1), AccessType::Read);

    let outcome = c.access(set0(2), AccessType::Read);
    assert_eq!(
        outcome.evicted,
        Some(Eviction {
            block_addr: set0(0),
            dirty: true
        })
    );
    assert_eq!(outcome.words_copied_back, 8);
    // The reused slot starts clean.
    assert_eq!(c.is_dirty(set0(2)), Some(false));
}

// ══════════════════════════════════════════════════════════
// 5. Allocation Policies
// ══════════════════════════════════════════════════════════

#[test]
fn no_write_allocate_write_miss_bypasses() {
    let mut c = cache(WritePolicy::WriteBack, AllocationPolicy::NoWriteAllocate);
    let _ = c.access(set0(0), AccessType::Fetch);
    let before = c.recency_order(0);

    let outcome = c.access(set0(1), AccessType::Write);
    assert!(!outcome.hit);
    assert!(!outcome.installed);
    assert_eq!(outcome.evicted, None);
    assert_eq!(outcome.words_copied_back, 1);
    assert_eq!(c.recency_order(0), before);
    assert!(!c.contains(set0(1)));
}

#[test]
fn no_write_allocate_read_miss_bypasses() {
    let mut c = cache(WritePolicy::WriteBack, AllocationPolicy::NoWriteAllocate);
    let outcome = c.access(0x100, AccessType::Read);
    assert!(!outcome.installed);
    assert_eq!(outcome.words_copied_back, 0);
    assert!(!c.contains(0x100));
}

#[test]
fn fetch_always_allocates() {
    let mut c = cache(WritePolicy::WriteThrough, AllocationPolicy::NoWriteAllocate);
    let outcome = c.access(0x100, AccessType::Fetch);
    assert!(outcome.installed);
    assert!(c.contains(0x100));
}

#[test]
fn write_allocate_write_miss_installs() {
    let mut c = cache(WritePolicy::WriteThrough, AllocationPolicy::WriteAllocate);
    let outcome = c.access(0x100, AccessType::Write);
    assert!(outcome.installed);
    assert_eq!(outcome.words_copied_back, 1);
    assert!(c.contains(0x100));
}

// ══════════════════════════════════════════════════════════
// 6. Flush
// ══════════════════════════════════════════════════════════

#[test]
fn flush_settles_dirty_lines() {
    let mut c = write_back();
    for addr in [0x000, 0x020, 0x040] {
        let _ = c.access(addr, AccessType::Read);
        let _ = c.access(addr, AccessType::Write);
    }
    let _ = c.access(0x060, AccessType::Read);
    assert_eq!(c.dirty_lines(), 3);

    let report = c.flush();
    assert_eq!(
        report,
        FlushReport {
            dirty_lines: 3,
            words_copied_back: 24
        }
    );
    assert_eq!(c.dirty_lines(), 0);
    // Residency survives the write-back.
    assert!(c.contains(0x000));

    assert_eq!(c.flush(), FlushReport::default());
}
