use anyhow::{Context, Result, bail};

/// Seed used when the command line names none.
pub const DEFAULT_SEED: u64 = 1337;
const RANGE_LIMIT: u64 = 10_000;

/// Resolve CLI seed tokens into a deduplicated list, preserving order.
///
/// Accepts decimal integers (negative values use their magnitude), `0x` hex
/// literals and inclusive ranges such as `1..=50`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Some((start, end)) = token.split_once("..=") {
            let start = parse_seed(start)?;
            let end = parse_seed(end)?;
            if end < start {
                bail!("Seed range {token} is empty");
            }
            if end - start >= RANGE_LIMIT {
                bail!("Seed range {token} expands past {RANGE_LIMIT} seeds");
            }
            seeds.extend(start..=end);
            continue;
        }

        seeds.push(parse_seed(token)?);
    }

    let mut deduped = Vec::with_capacity(seeds.len());
    for seed in seeds {
        if !deduped.contains(&seed) {
            deduped.push(seed);
        }
    }

    if deduped.is_empty() {
        deduped.push(DEFAULT_SEED);
    }

    Ok(deduped)
}

fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .with_context(|| format!("Unrecognized seed token: {token}"));
    }
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    bail!("Unrecognized seed token: {token}")
}
