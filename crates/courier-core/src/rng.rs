//! Random Source
//!
//! Every non-deterministic decision in the simulation (direction, step
//! distance, battle option, message selection, placement, turn order) draws
//! from a [`RandomSource`]. Replays are reproducible from the seed alone.
//!
//! Two generators sit behind the contract: the Monte Carlo generator (a linear
//! congruential step fed through Box–Muller and the normal CDF) and a uniform
//! `SmallRng`.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Largest f64 strictly below 1.0
const ONE_BELOW: f64 = 1.0 - f64::EPSILON;

/// Source of reproducible random integers
pub trait RandomSource {
    /// Next value in [0, 1)
    fn next_unit(&mut self) -> f64;

    /// Integer in the closed range [min, max]. A degenerate range yields `min`.
    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        let offset = (self.next_unit() * span as f64) as i64;
        min + offset.clamp(0, span - 1)
    }

    /// Integer in [0, n). Returns 0 when `n` is 0.
    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.range_inclusive(0, n as i64 - 1) as usize
    }

    /// Uniform pick from a slice
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.below(items.len())])
        }
    }

    /// Fisher–Yates shuffle
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

/// LCG + Box–Muller + normal CDF generator
#[derive(Debug, Clone)]
pub struct MonteCarloRng {
    state: u64,
    iterations: u64,
}

impl MonteCarloRng {
    pub const MULTIPLIER: u64 = 1597;
    pub const INCREMENT: u64 = 51749;
    pub const MODULUS: u64 = 244944;

    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % Self::MODULUS,
            iterations: 0,
        }
    }

    /// Number of unit draws performed so far
    pub fn iteration_count(&self) -> u64 {
        self.iterations
    }

    fn next_lcg(&mut self) -> u64 {
        self.state = (Self::MULTIPLIER * self.state + Self::INCREMENT) % Self::MODULUS;
        self.state
    }

    /// Two independent standard normal deviates
    fn box_muller(&mut self) -> (f64, f64) {
        // u1 is shifted into (0, 1] so the logarithm stays finite.
        let u1 = (self.next_lcg() + 1) as f64 / Self::MODULUS as f64;
        let u2 = self.next_lcg() as f64 / Self::MODULUS as f64;

        let mag = (-2.0 * u1.ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * u2;
        (mag * angle.cos(), mag * angle.sin())
    }
}

impl RandomSource for MonteCarloRng {
    fn next_unit(&mut self) -> f64 {
        self.iterations += 1;
        let (z, _) = self.box_muller();
        normal_cdf(z).clamp(0.0, ONE_BELOW)
    }
}

/// Abramowitz & Stegun 7.1.26, accurate to about 1.5e-7
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Milliseconds since the epoch
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Which generator backs [`SimRng`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RngKind {
    #[default]
    MonteCarlo,
    Uniform,
}

impl RngKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RngKind::MonteCarlo => "monte_carlo",
            RngKind::Uniform => "uniform",
        }
    }
}

impl FromStr for RngKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "monte_carlo" | "montecarlo" => Ok(RngKind::MonteCarlo),
            "uniform" => Ok(RngKind::Uniform),
            other => Err(format!("unknown generator `{other}` (expected monte_carlo or uniform)")),
        }
    }
}

#[derive(Debug, Clone)]
enum Generator {
    MonteCarlo(MonteCarloRng),
    Uniform(SmallRng),
}

/// Seeded random number generator resource
#[derive(Resource, Debug, Clone)]
pub struct SimRng {
    generator: Generator,
    kind: RngKind,
    seed: u64,
}

impl SimRng {
    pub fn new(kind: RngKind, seed: u64) -> Self {
        let generator = match kind {
            RngKind::MonteCarlo => Generator::MonteCarlo(MonteCarloRng::new(seed)),
            RngKind::Uniform => Generator::Uniform(SmallRng::seed_from_u64(seed)),
        };
        Self { generator, kind, seed }
    }

    /// Uses the given seed, or the wall clock when none is supplied
    pub fn seeded_or_clock(kind: RngKind, seed: Option<u64>) -> Self {
        Self::new(kind, seed.unwrap_or_else(clock_seed))
    }

    pub fn kind(&self) -> RngKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SimRng {
    fn next_unit(&mut self) -> f64 {
        match &mut self.generator {
            Generator::MonteCarlo(rng) => rng.next_unit(),
            Generator::Uniform(rng) => rng.gen::<f64>(),
        }
    }

    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        match &mut self.generator {
            Generator::MonteCarlo(rng) => rng.range_inclusive(min, max),
            Generator::Uniform(rng) => rng.gen_range(min..=max),
        }
    }
}

/// Replays a fixed script of integers, for forcing exact outcomes in tests
#[cfg(test)]
pub(crate) struct ScriptedRng {
    values: std::collections::VecDeque<i64>,
}

#[cfg(test)]
impl ScriptedRng {
    pub(crate) fn new(values: &[i64]) -> Self {
        Self {
            values: values.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRng {
    fn next_unit(&mut self) -> f64 {
        0.0
    }

    /// Next scripted value clamped into range; `min` once the script runs
    /// out. Degenerate ranges do not consume the script.
    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.values.pop_front().map_or(min, |v| v.clamp(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monte_carlo_determinism() {
        let mut a = MonteCarloRng::new(42);
        let mut b = MonteCarloRng::new(42);
        let xs: Vec<i64> = (0..200).map(|_| a.range_inclusive(1, 5)).collect();
        let ys: Vec<i64> = (0..200).map(|_| b.range_inclusive(1, 5)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.iteration_count(), 200);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = MonteCarloRng::new(42);
        let mut b = MonteCarloRng::new(43);
        let xs: Vec<f64> = (0..20).map(|_| a.next_unit()).collect();
        let ys: Vec<f64> = (0..20).map(|_| b.next_unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_unit_range() {
        let mut rng = MonteCarloRng::new(7);
        for _ in 0..5000 {
            let u = rng.next_unit();
            assert!((0.0..1.0).contains(&u), "{u} escaped [0, 1)");
        }
    }

    #[test]
    fn test_inclusive_bounds_hit_both_ends() {
        let mut rng = MonteCarloRng::new(1234);
        let draws: Vec<i64> = (0..2000).map(|_| rng.range_inclusive(1, 3)).collect();
        assert!(draws.iter().all(|d| (1..=3).contains(d)));
        assert!(draws.contains(&1));
        assert!(draws.contains(&3));
    }

    #[test]
    fn test_monte_carlo_is_roughly_uniform() {
        let mut rng = MonteCarloRng::new(999);
        let mut buckets = [0usize; 4];
        for _ in 0..10_000 {
            buckets[rng.below(4)] += 1;
        }
        for count in buckets {
            assert!(count > 2000 && count < 3000, "skewed buckets: {buckets:?}");
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = MonteCarloRng::new(3);
        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.range_inclusive(5, 2), 5);
        assert_eq!(rng.below(0), 0);
        assert_eq!(rng.below(1), 0);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn test_erf_reference_points() {
        assert!(erf(0.0).abs() < 1e-6);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = SimRng::new(RngKind::Uniform, 5);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_sim_rng_replays_both_generators() {
        for kind in [RngKind::MonteCarlo, RngKind::Uniform] {
            let mut a = SimRng::new(kind, 77);
            let mut b = SimRng::new(kind, 77);
            let xs: Vec<i64> = (0..50).map(|_| a.range_inclusive(0, 100)).collect();
            let ys: Vec<i64> = (0..50).map(|_| b.range_inclusive(0, 100)).collect();
            assert_eq!(xs, ys, "{kind:?} did not replay");
            assert_eq!(a.seed(), 77);
        }
    }

    #[test]
    fn test_rng_kind_parsing() {
        assert_eq!("monte-carlo".parse::<RngKind>(), Ok(RngKind::MonteCarlo));
        assert_eq!("Uniform".parse::<RngKind>(), Ok(RngKind::Uniform));
        assert!("gaussian".parse::<RngKind>().is_err());
        assert_eq!(RngKind::default().as_str(), "monte_carlo");
    }
}
