use anyhow::{Result, bail};

/// Seeds used when the caller asks for `all`.
pub const STANDARD_SEEDS: [&str; 5] = ["1337", "takedown", "regionals", "state-finals", "nationals"];

/// Seed used when no tokens survive resolution.
pub const DEFAULT_SEED: &str = "1337";

/// Resolve CLI seed tokens into the seed strings the random source is built from.
///
/// Tokens are trimmed; empty tokens are skipped and duplicates keep their first
/// position. The keyword `all` expands to [`STANDARD_SEEDS`].
///
/// # Errors
///
/// Returns an error for tokens containing whitespace or control characters,
/// which would not survive the round trip through a report.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<String>> {
    let mut seeds: Vec<String> = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if token.eq_ignore_ascii_case("all") {
            for seed in STANDARD_SEEDS {
                push_unique(&mut seeds, seed);
            }
            continue;
        }

        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            bail!("Unrecognized seed token: {token:?}");
        }

        push_unique(&mut seeds, token);
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED.to_string());
    }

    Ok(seeds)
}

/// Split a comma-separated CLI value into trimmed tokens.
#[must_use]
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',').map(|token| token.trim().to_string()).collect()
}

fn push_unique(seeds: &mut Vec<String>, seed: &str) {
    if !seeds.iter().any(|existing| existing == seed) {
        seeds.push(seed.to_string());
    }
}
