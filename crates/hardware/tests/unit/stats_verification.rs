//! Statistics Verification Tests.
//!
//! Checks counter updates, derived rates, and the text and JSON reports.

use cachesim_core::common::Stream;
use cachesim_core::core::units::cache::{AccessOutcome, Eviction};
use cachesim_core::stats::{CacheStats, SimStats, StreamReport};
use pretty_assertions::assert_eq;

fn miss_with_dirty_victim() -> AccessOutcome {
    AccessOutcome {
        hit: false,
        installed: true,
        evicted: Some(Eviction {
            block_addr: 0x400,
            dirty: true,
        }),
        words_copied_back: 4,
    }
}

#[test]
fn record_hit() {
    let mut stats = CacheStats::default();
    stats.record(&AccessOutcome {
        hit: true,
        ..AccessOutcome::default()
    });
    assert_eq!(
        stats,
        CacheStats {
            accesses: 1,
            misses: 0,
            replacements: 0,
            demand_fetches: 1,
            copies_back: 0,
        }
    );
    assert_eq!(stats.hits(), 1);
}

#[test]
fn record_miss_with_replacement() {
    let mut stats = CacheStats::default();
    stats.record(&miss_with_dirty_victim());
    stats.record(&AccessOutcome::default());
    assert_eq!(stats.accesses, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.replacements, 1);
    assert_eq!(stats.copies_back, 4);
    assert_eq!(stats.hits(), 0);
}

#[test]
fn rates_are_zero_when_idle() {
    let stats = CacheStats::default();
    assert_eq!(stats.miss_rate(), 0.0);
    assert_eq!(stats.hit_rate(), 0.0);
}

#[test]
fn rates_sum_to_one() {
    let stats = CacheStats {
        accesses: 8,
        misses: 2,
        ..CacheStats::default()
    };
    assert!((stats.miss_rate() - 0.25).abs() < f64::EPSILON);
    assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
}

#[test]
fn stream_report_snapshot() {
    let stats = CacheStats {
        accesses: 4,
        misses: 1,
        replacements: 1,
        demand_fetches: 4,
        copies_back: 8,
    };
    assert_eq!(
        StreamReport::from(&stats),
        StreamReport {
            accesses: 4,
            misses: 1,
            demand_fetches: 4,
            miss_rate: 0.25,
        }
    );
}

#[test]
fn totals_sum_both_streams() {
    let mut stats = SimStats::default();
    stats.stream_mut(Stream::Instruction).record(&AccessOutcome::default());
    stats.stream_mut(Stream::Data).record(&miss_with_dirty_victim());
    stats.stream_mut(Stream::Data).copies_back += 8;

    assert_eq!(stats.stream(Stream::Instruction).accesses, 1);
    assert_eq!(stats.total_demand_fetches(), 2);
    assert_eq!(stats.total_copies_back(), 12);
}

#[test]
fn render_text_report() {
    let stats = SimStats {
        instruction: CacheStats {
            accesses: 4,
            misses: 1,
            replacements: 0,
            demand_fetches: 4,
            copies_back: 0,
        },
        data: CacheStats {
            accesses: 2,
            misses: 2,
            replacements: 1,
            demand_fetches: 2,
            copies_back: 8,
        },
    };
    let expected = "
*** CACHE STATISTICS ***
 INSTRUCTIONS
  accesses:  4
  misses:    1
  miss rate: 0.2500 (hit rate 0.7500)
  replace:   0
 DATA
  accesses:  2
  misses:    2
  miss rate: 1.0000 (hit rate 0.0000)
  replace:   1
 TRAFFIC
  demand fetch:  6
  copies back:   8 words
";
    assert_eq!(stats.render(), expected);
}

#[test]
fn json_uses_field_names() {
    let mut stats = SimStats::default();
    stats.data.record(&miss_with_dirty_victim());

    let value: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
    assert_eq!(value["data"]["accesses"], 1);
    assert_eq!(value["data"]["replacements"], 1);
    assert_eq!(value["data"]["copies_back"], 4);
    assert_eq!(value["instruction"]["misses"], 0);
}
