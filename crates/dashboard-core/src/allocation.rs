//! Percentage allocation over a running budget
//!
//! Shares for the first N-1 items are drawn from what is left of a 100%
//! budget, each draw shrinking the pool for later items; the last item takes
//! the entire leftover. The result sums to 100 by construction rather than
//! by normalizing afterwards.

use crate::error::ConfigError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest ratio for which no drawn share can exceed the remaining pool
pub const MAX_RATIO: f64 = 2.0;

/// Bounds of the random ratio applied at each allocation step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub low: f64,
    pub high: f64,
}

impl RatioRange {
    /// Accepts `0 <= low <= high <= 2`.
    ///
    /// At step `i` the share is `remaining * ratio / (n - i)`, and `n - i`
    /// is at least 2 for every drawn step, so a ratio up to 2 never takes
    /// more than what remains.
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        let range = RatioRange { low, high };
        range.check("ratio_range")?;
        Ok(range)
    }

    pub(crate) fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.low.is_finite() && self.high.is_finite()) {
            return Err(ConfigError::Invalid {
                field,
                reason: "bounds must be finite".to_string(),
            });
        }
        if self.low > self.high {
            return Err(ConfigError::InvertedRange {
                field,
                low: self.low,
                high: self.high,
            });
        }
        if self.low < 0.0 || self.high > MAX_RATIO {
            return Err(ConfigError::Invalid {
                field,
                reason: format!("ratios must lie within 0..={}", MAX_RATIO),
            });
        }
        Ok(())
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.low == self.high {
            self.low
        } else {
            rng.gen_range(self.low..=self.high)
        }
    }
}

/// Split 100% into `count` shares, in draw order.
///
/// Returns an empty vector for `count == 0` and `[100.0]` for `count == 1`.
pub fn allocate_percentages<R: Rng + ?Sized>(
    count: usize,
    ratio: RatioRange,
    rng: &mut R,
) -> Vec<f64> {
    let mut shares = Vec::with_capacity(count);
    let mut remaining = 100.0_f64;

    for i in 0..count {
        if i + 1 < count {
            let share = remaining * ratio.sample(rng) / (count - i) as f64;
            shares.push(share);
            remaining -= share;
        } else {
            // leftover goes to the last item
            shares.push(remaining.max(0.0));
        }
    }

    shares
}

/// Same as [`allocate_percentages`], largest share first
pub fn allocate_percentages_sorted<R: Rng + ?Sized>(
    count: usize,
    ratio: RatioRange,
    rng: &mut R,
) -> Vec<f64> {
    let mut shares = allocate_percentages(count, ratio, rng);
    shares.sort_by(|a, b| b.total_cmp(a));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_and_single() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let ratio = RatioRange::new(0.15, 0.25).unwrap();
        assert!(allocate_percentages(0, ratio, &mut rng).is_empty());
        assert_eq!(allocate_percentages(1, ratio, &mut rng), vec![100.0]);
    }

    #[test]
    fn test_sorted_is_descending() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ratio = RatioRange::new(0.08, 0.35).unwrap();
        let shares = allocate_percentages_sorted(10, ratio, &mut rng);
        assert!(shares.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_ratio_range_rejects_bad_bounds() {
        assert!(matches!(
            RatioRange::new(0.5, 0.1),
            Err(ConfigError::InvertedRange { .. })
        ));
        assert!(RatioRange::new(0.5, 2.5).is_err());
        assert!(RatioRange::new(-0.1, 0.5).is_err());
        assert!(RatioRange::new(2.0, 2.0).is_ok());
    }

    #[test]
    fn test_max_ratio_never_goes_negative() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ratio = RatioRange::new(2.0, 2.0).unwrap();
        let shares = allocate_percentages(6, ratio, &mut rng);
        assert!(shares.iter().all(|s| *s >= 0.0));
        assert!((shares.iter().sum::<f64>() - 100.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_hundred(
            count in 1usize..64,
            low in 0.0f64..2.0,
            width in 0.0f64..1.0,
            seed in any::<u64>(),
        ) {
            let high = (low + width).min(MAX_RATIO);
            let ratio = RatioRange::new(low, high).unwrap();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let shares = allocate_percentages(count, ratio, &mut rng);

            prop_assert_eq!(shares.len(), count);
            prop_assert!((shares.iter().sum::<f64>() - 100.0).abs() < 1e-6);
            prop_assert!(shares.iter().all(|s| (0.0..=100.0).contains(s)));
        }
    }
}
