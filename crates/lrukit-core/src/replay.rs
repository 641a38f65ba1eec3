//! Scripted replay and differential comparison of cache variants.
//!
//! A script is a sequence of [`CacheOp`]s in either of two forms:
//!
//! ```text
//! # text form: one op per line
//! put 1 1
//! get 1
//! ```
//!
//! ```json
//! [{"op":"put","key":1,"value":1},{"op":"get","key":1}]
//! ```
//!
//! [`compare_variants`] runs one script through both variants and reports
//! the first observable difference.

use std::fmt::Display;
use std::hash::Hash;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arena_cache::InvariantReport;
use crate::contract::RecencyCache;
use crate::error::{CacheError, ScriptError};
use crate::variant::{CacheVariant, LruCache};

/// One call against the public cache contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum CacheOp<K, V> {
    Get { key: K },
    Put { key: K, value: V },
}

/// Result of one `get` during a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetOutcome<K, V> {
    /// Index of the op in the script.
    pub step: usize,
    pub key: K,
    pub value: Option<V>,
}

/// Everything a caller can observe from running a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayTrace<K, V> {
    pub gets: Vec<GetOutcome<K, V>>,
    /// Resident keys after the last op, least- to most-recently used.
    pub resident: Vec<K>,
}

/// First point where the two variants disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Divergence<K, V> {
    Get {
        step: usize,
        key: K,
        linked: Option<V>,
        arena: Option<V>,
    },
    Resident {
        linked: Vec<K>,
        arena: Vec<K>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct DifferentialReport<K, V> {
    pub capacity: usize,
    pub ops: usize,
    pub linked: ReplayTrace<K, V>,
    pub arena: ReplayTrace<K, V>,
    pub divergence: Option<Divergence<K, V>>,
    /// Pool audit of the arena variant after the last op.
    pub arena_violations: Vec<String>,
}

impl<K, V> DifferentialReport<K, V> {
    pub fn is_equivalent(&self) -> bool {
        self.divergence.is_none() && self.arena_violations.is_empty()
    }
}

/// Run `ops` against `cache`, recording every `get` result.
pub fn replay<K, V, C>(cache: &mut C, ops: &[CacheOp<K, V>]) -> ReplayTrace<K, V>
where
    K: Clone,
    V: Clone,
    C: RecencyCache<K, V> + ?Sized,
{
    let mut gets = Vec::new();
    for (step, op) in ops.iter().enumerate() {
        match op {
            CacheOp::Get { key } => gets.push(GetOutcome {
                step,
                key: key.clone(),
                value: cache.get(key),
            }),
            CacheOp::Put { key, value } => cache.put(key.clone(), value.clone()),
        }
    }
    ReplayTrace {
        gets,
        resident: cache.keys_lru(),
    }
}

/// Replay `ops` through a fresh cache of each variant and compare.
pub fn compare_variants<K, V>(
    capacity: usize,
    ops: &[CacheOp<K, V>],
) -> Result<DifferentialReport<K, V>, CacheError>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    let mut linked_cache = LruCache::with_variant(CacheVariant::Linked, capacity)?;
    let mut arena_cache = LruCache::with_variant(CacheVariant::Arena, capacity)?;

    let linked = replay(&mut linked_cache, ops);
    let arena = replay(&mut arena_cache, ops);

    let divergence = first_divergence(&linked, &arena);
    if let Some(divergence) = &divergence {
        let at = match divergence {
            Divergence::Get { step, .. } => Some(*step),
            Divergence::Resident { .. } => None,
        };
        tracing::debug!(capacity, ops = ops.len(), step = ?at, "cache variants diverged");
    }

    let arena_violations = match &arena_cache {
        LruCache::Arena(cache) => cache.check_invariants(),
        LruCache::Linked(_) => InvariantReport::default(),
    }
    .violations;

    Ok(DifferentialReport {
        capacity,
        ops: ops.len(),
        linked,
        arena,
        divergence,
        arena_violations,
    })
}

fn first_divergence<K, V>(
    linked: &ReplayTrace<K, V>,
    arena: &ReplayTrace<K, V>,
) -> Option<Divergence<K, V>>
where
    K: Eq + Clone,
    V: Clone + PartialEq,
{
    for (left, right) in linked.gets.iter().zip(&arena.gets) {
        if left.value != right.value {
            return Some(Divergence::Get {
                step: left.step,
                key: left.key.clone(),
                linked: left.value.clone(),
                arena: right.value.clone(),
            });
        }
    }
    if linked.resident != arena.resident {
        return Some(Divergence::Resident {
            linked: linked.resident.clone(),
            arena: arena.resident.clone(),
        });
    }
    None
}

/// Parse a script in JSON form (a top-level array) or text form.
pub fn parse_script<K, V>(content: &str) -> Result<Vec<CacheOp<K, V>>, ScriptError>
where
    K: FromStr + DeserializeOwned,
    V: FromStr + DeserializeOwned,
    K::Err: Display,
    V::Err: Display,
{
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    let mut ops = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        ops.push(parse_line(line).map_err(|message| ScriptError::Parse {
            line: index + 1,
            message,
        })?);
    }
    Ok(ops)
}

fn parse_line<K, V>(line: &str) -> Result<CacheOp<K, V>, String>
where
    K: FromStr,
    V: FromStr,
    K::Err: Display,
    V::Err: Display,
{
    let words: Vec<&str> = line.split_whitespace().collect();
    let parse_key = |raw: &str| raw.parse::<K>().map_err(|e| format!("bad key `{raw}`: {e}"));
    match words.as_slice() {
        [op, key] if op.eq_ignore_ascii_case("get") => Ok(CacheOp::Get {
            key: parse_key(*key)?,
        }),
        [op, key, value] if op.eq_ignore_ascii_case("put") => Ok(CacheOp::Put {
            key: parse_key(*key)?,
            value: value
                .parse()
                .map_err(|e| format!("bad value `{value}`: {e}"))?,
        }),
        [op, ..] if op.eq_ignore_ascii_case("get") => {
            Err("expected `get <key>`".to_string())
        }
        [op, ..] if op.eq_ignore_ascii_case("put") => {
            Err("expected `put <key> <value>`".to_string())
        }
        [op, ..] => Err(format!("unknown op `{op}`")),
        [] => Err("empty line".to_string()),
    }
}

/// The capacity-2 walkthrough: promote on read, then two evictions.
pub fn builtin_scenario() -> Vec<CacheOp<i64, i64>> {
    vec![
        CacheOp::Put { key: 1, value: 1 },
        CacheOp::Put { key: 2, value: 2 },
        CacheOp::Get { key: 1 },
        CacheOp::Put { key: 3, value: 3 },
        CacheOp::Get { key: 2 },
        CacheOp::Put { key: 4, value: 4 },
        CacheOp::Get { key: 1 },
        CacheOp::Get { key: 3 },
        CacheOp::Get { key: 4 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_cache::ArenaLruCache;

    #[test]
    fn builtin_scenario_results() {
        for variant in CacheVariant::ALL {
            let mut cache = LruCache::with_variant(variant, 2).unwrap();
            let trace = replay(&mut cache, &builtin_scenario());
            let values: Vec<_> = trace.gets.iter().map(|g| g.value).collect();
            assert_eq!(values, vec![Some(1), None, None, Some(3), Some(4)], "{variant}");
            assert_eq!(trace.resident, vec![3, 4], "{variant}");
        }
    }

    #[test]
    fn replay_records_steps_and_keys() {
        let mut cache: ArenaLruCache<i64, i64> = ArenaLruCache::new(2).unwrap();
        let trace = replay(&mut cache, &builtin_scenario());
        assert_eq!(trace.gets[0].step, 2);
        assert_eq!(trace.gets[0].key, 1);
        assert_eq!(trace.gets[1].step, 4);
    }

    #[test]
    fn variants_agree_on_builtin_scenario() {
        let report = compare_variants(2, &builtin_scenario()).unwrap();
        assert!(report.is_equivalent());
        assert_eq!(report.ops, 9);
        assert_eq!(report.linked, report.arena);
    }

    #[test]
    fn compare_rejects_zero_capacity() {
        let err = compare_variants(0, &builtin_scenario()).unwrap_err();
        assert_eq!(err, CacheError::ZeroCapacity);
    }

    #[test]
    fn first_divergence_reports_get_mismatch() {
        let linked = ReplayTrace {
            gets: vec![GetOutcome {
                step: 3,
                key: 7,
                value: Some(1),
            }],
            resident: vec![7],
        };
        let arena = ReplayTrace {
            gets: vec![GetOutcome {
                step: 3,
                key: 7,
                value: None,
            }],
            resident: vec![],
        };
        assert_eq!(
            first_divergence(&linked, &arena),
            Some(Divergence::Get {
                step: 3,
                key: 7,
                linked: Some(1),
                arena: None,
            })
        );
    }

    #[test]
    fn first_divergence_reports_resident_mismatch() {
        let linked: ReplayTrace<i32, i32> = ReplayTrace {
            gets: vec![],
            resident: vec![1, 2],
        };
        let arena = ReplayTrace {
            gets: vec![],
            resident: vec![2, 1],
        };
        assert!(matches!(
            first_divergence(&linked, &arena),
            Some(Divergence::Resident { .. })
        ));
    }

    #[test]
    fn parse_text_script() {
        let ops: Vec<CacheOp<i64, i64>> =
            parse_script("# warm up\nput 1 10\n\nGET 1   # hit\nput -2 -1\n").unwrap();
        assert_eq!(
            ops,
            vec![
                CacheOp::Put { key: 1, value: 10 },
                CacheOp::Get { key: 1 },
                CacheOp::Put { key: -2, value: -1 },
            ]
        );
    }

    #[test]
    fn parse_json_script() {
        let ops: Vec<CacheOp<i64, i64>> =
            parse_script(r#"[{"op":"put","key":1,"value":2},{"op":"get","key":1}]"#).unwrap();
        assert_eq!(
            ops,
            vec![CacheOp::Put { key: 1, value: 2 }, CacheOp::Get { key: 1 }]
        );
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let err = parse_script::<i64, i64>("put 1 1\npop 1\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2: unknown op `pop`");

        let err = parse_script::<i64, i64>("get\n").unwrap_err();
        assert_eq!(err.to_string(), "line 1: expected `get <key>`");

        let err = parse_script::<i64, i64>("put x 1\n").unwrap_err();
        assert!(err.to_string().starts_with("line 1: bad key `x`"));
    }

    #[test]
    fn bad_json_script_is_reported() {
        let err = parse_script::<i64, i64>(r#"[{"op":"pop","key":1}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Json(_)));
    }

    #[test]
    fn report_serializes_divergence_kind() {
        let report = compare_variants(1, &[CacheOp::Put { key: 1u8, value: 1u8 }]).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["divergence"], serde_json::Value::Null);
        assert_eq!(json["arena"]["resident"], serde_json::json!([1]));

        let divergence: Divergence<u8, u8> = Divergence::Resident {
            linked: vec![1],
            arena: vec![],
        };
        let json = serde_json::to_value(&divergence).unwrap();
        assert_eq!(json["kind"], "resident");
    }
}
