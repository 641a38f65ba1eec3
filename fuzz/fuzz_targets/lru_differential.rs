#![no_main]

use lrukit_core::replay::{CacheOp, compare_variants};
use lrukit_core::{ArenaLruCache, RecencyCache};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 65_536 {
        return;
    }
    let Some((&capacity_raw, rest)) = data.split_first() else {
        return;
    };
    let capacity = usize::from(capacity_raw % 32) + 1;

    let mut ops = Vec::with_capacity(rest.len() / 3);
    for chunk in rest.chunks(3) {
        let [op_tag, key_raw, value_raw] = match chunk {
            [a, b, c] => [*a, *b, *c],
            _ => break,
        };
        // Key space a little wider than the largest capacity so both hits
        // and evictions are common.
        let key = key_raw % 48;
        if op_tag & 1 == 0 {
            ops.push(CacheOp::Get { key });
        } else {
            ops.push(CacheOp::Put {
                key,
                value: value_raw,
            });
        }
    }

    let report = compare_variants(capacity, &ops).expect("capacity is non-zero");
    assert!(
        report.divergence.is_none(),
        "LRU variants diverged under fuzz input: {:?}",
        report.divergence
    );
    assert!(
        report.arena_violations.is_empty(),
        "arena invariant violation under fuzz input: {:?}",
        report.arena_violations
    );

    // Audit after every op, not just at the end.
    let mut cache: ArenaLruCache<u8, u8> =
        ArenaLruCache::new(capacity).expect("capacity is non-zero");
    for op in &ops {
        match op {
            CacheOp::Get { key } => {
                let _ = cache.get(key);
            }
            CacheOp::Put { key, value } => cache.put(*key, *value),
        }
        assert!(cache.len() <= capacity);
        let invariants = cache.check_invariants();
        assert!(
            invariants.is_clean(),
            "arena invariant violation after {op:?}: {:?}",
            invariants.violations
        );
    }
});
