//! lrukit CLI
//!
//! Thin wrapper over `lrukit-core`: runs operation scripts through the LRU
//! cache variants and reports results on stdout. Logs go to stderr.

use std::fmt::Display;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use lrukit_core::config::Config;
use lrukit_core::logging::init_logging;
use lrukit_core::replay::{
    CacheOp, Divergence, ReplayTrace, builtin_scenario, compare_variants, parse_script, replay,
};
use lrukit_core::{CacheVariant, LruCache};

mod cli;

use cli::{Cli, Command};

/// Key and value type for scripts given on the command line.
type Scalar = i64;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = resolve_config(&cli)?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    match cli.command {
        Command::Demo { capacity } => {
            let capacity = capacity.unwrap_or(config.cache.capacity);
            run_demo(capacity)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay {
            script,
            capacity,
            variant,
            json,
        } => {
            let capacity = capacity.unwrap_or(config.cache.capacity);
            let variant = variant.unwrap_or(config.cache.variant);
            let ops = load_script(&script)?;
            run_replay(variant, capacity, &ops, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Diff {
            script,
            capacity,
            json,
        } => {
            let capacity = capacity.unwrap_or(config.cache.capacity);
            let ops = load_script(&script)?;
            run_diff(capacity, &ops, json)
        }
    }
}

/// Config file (if any), then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level.clone_from(level);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    Ok(config)
}

fn load_script(path: &Path) -> Result<Vec<CacheOp<Scalar, Scalar>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let ops = parse_script(&content)
        .with_context(|| format!("failed to parse script {}", path.display()))?;
    tracing::debug!(path = %path.display(), ops = ops.len(), "loaded script");
    Ok(ops)
}

fn build_cache(variant: CacheVariant, capacity: usize) -> Result<LruCache<Scalar, Scalar>> {
    LruCache::with_variant(variant, capacity)
        .with_context(|| format!("cannot build {variant} cache with capacity {capacity}"))
}

fn run_demo(capacity: usize) -> Result<()> {
    let ops = builtin_scenario();
    // Build every cache up front so a rejected capacity prints nothing.
    let caches = CacheVariant::ALL
        .into_iter()
        .map(|variant| build_cache(variant, capacity))
        .collect::<Result<Vec<_>>>()?;
    for (i, mut cache) in caches.into_iter().enumerate() {
        let variant = cache.variant();
        let trace = replay(&mut cache, &ops);
        if i > 0 {
            println!();
        }
        println!("== {} (capacity {capacity}) ==", variant.type_name());
        print_trace(&trace);
    }
    Ok(())
}

fn run_replay(
    variant: CacheVariant,
    capacity: usize,
    ops: &[CacheOp<Scalar, Scalar>],
    json: bool,
) -> Result<()> {
    let mut cache = build_cache(variant, capacity)?;
    let trace = replay(&mut cache, ops);
    if json {
        let output = serde_json::json!({
            "variant": variant,
            "capacity": capacity,
            "gets": trace.gets,
            "resident": trace.resident,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("== {} (capacity {capacity}) ==", variant.type_name());
        print_trace(&trace);
    }
    Ok(())
}

fn run_diff(capacity: usize, ops: &[CacheOp<Scalar, Scalar>], json: bool) -> Result<ExitCode> {
    let report = compare_variants(capacity, ops)
        .with_context(|| format!("cannot build caches with capacity {capacity}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.divergence {
            None => println!(
                "equivalent: {} ops, {} gets, capacity {capacity}",
                report.ops,
                report.linked.gets.len()
            ),
            Some(Divergence::Get {
                step,
                key,
                linked,
                arena,
            }) => println!(
                "diverged at step {step} (get {key}): linked={} arena={}",
                show(linked.as_ref()),
                show(arena.as_ref())
            ),
            Some(Divergence::Resident { linked, arena }) => println!(
                "diverged in resident keys: linked=[{}] arena=[{}]",
                join(linked),
                join(arena)
            ),
        }
        for violation in &report.arena_violations {
            println!("arena invariant violated: {violation}");
        }
    }

    if report.is_equivalent() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(capacity, ops = report.ops, "cache variants disagree");
        Ok(ExitCode::FAILURE)
    }
}

fn print_trace(trace: &ReplayTrace<Scalar, Scalar>) {
    for outcome in &trace.gets {
        println!("get {} -> {}", outcome.key, show(outcome.value.as_ref()));
    }
    println!("resident (lru -> mru): [{}]", join(&trace.resident));
}

fn show<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "absent".to_string(), ToString::to_string)
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
