//! Team-name feature hashing.
//!
//! Each team name is reduced to a pseudo-numeric scalar in `[0, 1)` with
//! 64-bit FNV-1a, then both scalars are expanded into a fixed 10-element row.
//! FNV-1a is pinned so the same names always map to the same row, across
//! restarts and platforms.

use crate::error::PredictionError;

/// Number of features the model expects per row.
pub const FEATURE_COUNT: usize = 10;

/// Buckets used to reduce a name hash to `[0, 1)`.
const HASH_BUCKETS: u64 = 1000;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A single model input row.
pub type FeatureRow = [f64; FEATURE_COUNT];

fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// `fnv1a(name) mod 1000 / 1000`
pub fn team_hash(name: &str) -> f64 {
    (fnv1a_64(name.as_bytes()) % HASH_BUCKETS) as f64 / HASH_BUCKETS as f64
}

/// Expand the home (`h`) and away (`a`) scalars into the model row.
pub fn build_features(h: f64, a: f64) -> FeatureRow {
    [
        h,
        a,
        (h - a).abs(),
        (h + a) / 2.0,
        h * a,
        h * h,
        a * a,
        (h + a).rem_euclid(1.0),
        (h - 0.5).abs(),
        (a - 0.5).abs(),
    ]
}

/// Hash both team names and build a validated feature row.
pub fn team_features(home_team: &str, away_team: &str) -> Result<FeatureRow, PredictionError> {
    let row = build_features(team_hash(home_team), team_hash(away_team));
    if let Some((index, value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(PredictionError::InvalidFeatures { index, value: *value });
    }
    Ok(row)
}
