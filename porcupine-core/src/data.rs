//! Core data types: generation size, splittable seeds and run configuration.

use std::fmt;
use std::time::Duration;

/// Consecutive misses tolerated by `filter`, `unique` and `ignore_failures`
/// before generation fails with a configuration error.
pub const MAX_MISSES: usize = 10_000;

/// Upper bound on the number of values an exhaustive enumerator may declare.
pub const MAX_EXHAUSTIVE_COUNT: u64 = 200_000;

/// Default cap on the number of edge cases a generator hands out.
pub const DEFAULT_MAX_EDGE_CASES: usize = 20;

/// Size parameter for controlling test data generation.
///
/// Size typically ranges from 0 to 100, where larger values
/// generate more complex test data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Golden ratio progression for size scaling.
    ///
    /// Recursive generators hand this smaller size to each nested level, so
    /// any chain of nested `lazy`/`lazy_of` calls reaches size zero.
    pub fn golden(&self) -> Self {
        Size((self.0 as f64 * 0.61803398875) as usize)
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic generation.
///
/// Seeds are values: drawing from one returns the advanced seed, and
/// splitting yields two independent streams. Every generator receives its
/// own split, which is what makes a sample depend only on `(seed, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Split off `count` independent seeds, leaving the receiver untouched.
    pub fn split_n(self, count: usize) -> Vec<Seed> {
        let mut seeds = Vec::with_capacity(count);
        let mut current = self;
        for _ in 0..count {
            let (taken, rest) = current.split();
            seeds.push(taken);
            current = rest;
        }
        seeds
    }

    /// Generate the next random value and advance the seed.
    /// Uses SplitMix64 algorithm for high-quality randomness.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a bounded random value [0, bound).
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, new_seed) = self.next_u64();
        (((value as u128 * bound as u128) >> 64) as u64, new_seed)
    }

    /// Generate a bounded random value [0, bound) for bounds beyond `u64`.
    pub fn next_bounded_u128(self, bound: u128) -> (u128, Self) {
        if bound <= u64::MAX as u128 {
            let (value, seed) = self.next_bounded(bound as u64);
            return (value as u128, seed);
        }
        let (high, seed) = self.next_u64();
        let (low, seed) = seed.next_u64();
        let wide = ((high as u128) << 64) | low as u128;
        (wide % bound, seed)
    }

    /// Generate a random bool.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, new_seed) = self.next_u64();
        (value & 1 == 1, new_seed)
    }

    /// Generate a float in [0, 1).
    pub fn next_unit(self) -> (f64, Self) {
        let (value, new_seed) = self.next_u64();
        ((value >> 11) as f64 / (1u64 << 53) as f64, new_seed)
    }

    /// Generate a random seed.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed(rng.gen(), rng.gen())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// How far a failing sample is minimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkingMode {
    /// Report the original failing sample.
    Off,
    /// Shrink until converged or until the duration has elapsed.
    Bounded(Duration),
    /// Shrink until converged.
    Full,
}

/// Where trial samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Exhaustive when the whole space fits in the test limit, random otherwise.
    Auto,
    Randomized,
    Exhaustive,
    EdgeCasesOnly,
}

/// How edge cases are interleaved with random samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeCasesMode {
    /// All edge cases are tried before any random sample.
    First,
    /// Edge cases are mixed into the random samples.
    Mixin,
    None,
}

/// Configuration for property checking.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of tests to run.
    pub test_limit: usize,

    /// Maximum size parameter to use.
    pub size_limit: usize,

    /// Maximum number of discarded (invalid) trials before giving up.
    pub discard_limit: usize,

    /// Fixed seed; a random one is drawn when absent.
    pub seed: Option<u64>,

    pub shrinking: ShrinkingMode,

    pub generation: GenerationMode,

    pub edge_cases: EdgeCasesMode,

    /// Maximum number of edge cases per parameter list.
    pub max_edge_cases: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            test_limit: 1000,
            size_limit: 100,
            discard_limit: 5000,
            seed: None,
            shrinking: ShrinkingMode::Bounded(Duration::from_secs(10)),
            generation: GenerationMode::Auto,
            edge_cases: EdgeCasesMode::Mixin,
            max_edge_cases: DEFAULT_MAX_EDGE_CASES,
        }
    }
}

impl Config {
    /// Create a new config with the given number of tests.
    pub fn with_tests(mut self, tests: usize) -> Self {
        self.test_limit = tests;
        self.discard_limit = tests.saturating_mul(5);
        self
    }

    /// Create a new config with the given size limit.
    pub fn with_size_limit(mut self, size: usize) -> Self {
        self.size_limit = size;
        self
    }

    pub fn with_discard_limit(mut self, limit: usize) -> Self {
        self.discard_limit = limit;
        self
    }

    /// Run with a fixed seed so failures can be replayed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_shrinking(mut self, shrinking: ShrinkingMode) -> Self {
        self.shrinking = shrinking;
        self
    }

    pub fn with_generation(mut self, generation: GenerationMode) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_edge_cases(mut self, edge_cases: EdgeCasesMode) -> Self {
        self.edge_cases = edge_cases;
        self
    }

    pub fn with_max_edge_cases(mut self, max: usize) -> Self {
        self.max_edge_cases = max;
        self
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}
