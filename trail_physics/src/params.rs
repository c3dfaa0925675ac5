//! Per-chain spring parameters.
//!
//! Every chain gets its own spring/damping/friction/tension values so that
//! several chains chasing the same anchor still look distinct.  Values are
//! drawn from fixed ranges with a caller-supplied RNG, or given explicitly.

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Accepted ranges
// ════════════════════════════════════════════════════════════════════════════

pub const SPRING_RANGE:   RangeInclusive<f32> = 0.40..=0.50;
pub const DAMPING_RANGE:  RangeInclusive<f32> = 0.20..=0.25;
pub const FRICTION_RANGE: RangeInclusive<f32> = 0.45..=0.50;
pub const TENSION_RANGE:  RangeInclusive<f32> = 0.98..=0.99;

// ════════════════════════════════════════════════════════════════════════════
// ChainParams
// ════════════════════════════════════════════════════════════════════════════

/// Scalar parameters of one chain's damped-spring recurrence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Spring coefficient applied to particle 1.
    pub spring:   f32,
    /// Momentum transfer from the predecessor, also the normal lerp factor.
    pub damping:  f32,
    /// Velocity multiplier applied every tick (energy loss).
    pub friction: f32,
    /// Per-particle attenuation of the spring coefficient down the chain.
    pub tension:  f32,
}

impl ChainParams {
    pub fn new(spring: f32, damping: f32, friction: f32, tension: f32) -> Self {
        ChainParams { spring, damping, friction, tension }
    }

    /// Draw every parameter uniformly from its range.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ChainParams {
            spring:   rng.gen_range(SPRING_RANGE),
            damping:  rng.gen_range(DAMPING_RANGE),
            friction: rng.gen_range(FRICTION_RANGE),
            tension:  rng.gen_range(TENSION_RANGE),
        }
    }

    /// The centre of every range.
    pub fn midpoint() -> Self {
        let mid = |r: RangeInclusive<f32>| (r.start() + r.end()) * 0.5;
        ChainParams {
            spring:   mid(SPRING_RANGE),
            damping:  mid(DAMPING_RANGE),
            friction: mid(FRICTION_RANGE),
            tension:  mid(TENSION_RANGE),
        }
    }

    /// True when every value lies inside its range.
    pub fn in_range(&self) -> bool {
        SPRING_RANGE.contains(&self.spring)
            && DAMPING_RANGE.contains(&self.damping)
            && FRICTION_RANGE.contains(&self.friction)
            && TENSION_RANGE.contains(&self.tension)
    }

    /// Clamp every value into its range.  NaN falls back to the range midpoint.
    pub fn clamped(self) -> Self {
        let clamp = |v: f32, r: RangeInclusive<f32>| {
            if v.is_nan() { (r.start() + r.end()) * 0.5 } else { v.clamp(*r.start(), *r.end()) }
        };
        ChainParams {
            spring:   clamp(self.spring,   SPRING_RANGE),
            damping:  clamp(self.damping,  DAMPING_RANGE),
            friction: clamp(self.friction, FRICTION_RANGE),
            tension:  clamp(self.tension,  TENSION_RANGE),
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self { ChainParams::midpoint() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sampled_params_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            assert!(ChainParams::sample(&mut rng).in_range());
        }
    }

    #[test]
    fn same_seed_same_params() {
        let a = ChainParams::sample(&mut StdRng::seed_from_u64(42));
        let b = ChainParams::sample(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn midpoint_matches_reference_values() {
        let p = ChainParams::midpoint();
        assert!((p.spring   - 0.45 ).abs() < 1e-6);
        assert!((p.damping  - 0.225).abs() < 1e-6);
        assert!((p.friction - 0.475).abs() < 1e-6);
        assert!((p.tension  - 0.985).abs() < 1e-6);
    }

    #[test]
    fn clamped_pulls_outliers_in() {
        let p = ChainParams::new(2.0, -1.0, f32::NAN, 0.5).clamped();
        assert!(p.in_range());
        assert_eq!(p.spring, 0.5);
        assert_eq!(p.damping, 0.2);
        assert!((p.friction - 0.475).abs() < 1e-6);
        assert_eq!(p.tension, 0.98);
    }
}
