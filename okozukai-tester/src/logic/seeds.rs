use anyhow::{Context, Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 100_000;

/// Resolve a list of CLI seed arguments into concrete seeds.
///
/// Supports literal integers (negative values use their magnitude) and inclusive
/// ranges written `start..end`. Duplicates are dropped, first occurrence wins.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending: Vec<u64> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..") {
            pending.extend(parse_range(start, end).with_context(|| format!("seed range {token}"))?);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(value.unsigned_abs());
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(value);
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    let mut seen = HashSet::new();
    pending.retain(|seed| seen.insert(*seed));

    if pending.is_empty() {
        pending.push(DEFAULT_SEED);
    }

    Ok(pending)
}

/// Expand `iterations` consecutive seeds from each base seed.
#[must_use]
pub fn expand_iterations(seeds: &[u64], iterations: usize) -> Vec<u64> {
    let mut expanded = Vec::with_capacity(seeds.len() * iterations.max(1));
    let mut seen = HashSet::new();
    for &seed in seeds {
        let mut next = seed;
        for _ in 0..iterations.max(1) {
            if seen.insert(next) {
                expanded.push(next);
            }
            next = next.wrapping_add(1);
        }
    }
    expanded
}

fn parse_range(start: &str, end: &str) -> Result<std::ops::RangeInclusive<u64>> {
    let start: u64 = start.trim().parse().context("invalid range start")?;
    let end: u64 = end.trim().parse().context("invalid range end")?;
    if end < start {
        bail!("range end {end} is before start {start}");
    }
    if end - start >= MAX_RANGE_LEN {
        bail!("range covers more than {MAX_RANGE_LEN} seeds");
    }
    Ok(start..=end)
}
