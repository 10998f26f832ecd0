//! Pure aggregation over rating rows: count, mean, and score histogram.
//!
//! Kept free of database access so the statistics contract is testable on
//! its own; the rating service feeds it `(score, count)` buckets straight
//! from a GROUP BY over live ledger rows.

use serde::Serialize;
use std::collections::BTreeMap;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 5;

/// Per-media rating statistics.
///
/// `rating_distribution` always carries the keys "1" through "5",
/// zero-filled, regardless of which scores exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub total_ratings: i64,
    pub average_rating: f64,
    pub rating_distribution: BTreeMap<String, i64>,
}

impl RatingStats {
    pub fn empty() -> Self {
        Self {
            total_ratings: 0,
            average_rating: 0.0,
            rating_distribution: zero_distribution(),
        }
    }

    /// Assemble stats from `(score, count)` buckets. Scores outside 1..=5
    /// cannot exist (schema CHECK constraint) and are ignored if seen.
    pub fn from_buckets(buckets: &[(i32, i64)]) -> Self {
        let mut distribution = zero_distribution();
        let mut total: i64 = 0;
        let mut sum: i64 = 0;

        for &(score, count) in buckets {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                continue;
            }
            distribution.insert(score.to_string(), count);
            total += count;
            sum += i64::from(score) * count;
        }

        let average = if total == 0 {
            0.0
        } else {
            round_half_up(sum as f64 / total as f64, 2)
        };

        Self {
            total_ratings: total,
            average_rating: average,
            rating_distribution: distribution,
        }
    }
}

fn zero_distribution() -> BTreeMap<String, i64> {
    (MIN_SCORE..=MAX_SCORE)
        .map(|score| (score.to_string(), 0))
        .collect()
}

/// Round half-up to `decimals` places. Only used for non-negative means.
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}
