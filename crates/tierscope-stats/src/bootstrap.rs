//! Seeded, parallel percentile bootstrap.
//!
//! Resampling is split into fixed-size chunks of [`CHUNK_SIZE`] replicates.
//! One [`Pcg32`] seed per chunk is drawn up front from the caller's RNG, and
//! the chunks are then spread over worker threads. A chunk always sees the
//! same seed no matter which worker runs it, so the interval depends only on
//! the caller's RNG state and never on the worker count.
//!
//! # Examples
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use tierscope_stats::{bootstrap::Bootstrap, percentiles::median};
//!
//! let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! let bootstrap = Bootstrap::new(2000).with_workers(4);
//!
//! let mut rng = Pcg32::seed_from_u64(42);
//! let a = bootstrap.percentile_interval(&data, median, &mut rng).unwrap();
//! let mut rng = Pcg32::seed_from_u64(42);
//! let b = bootstrap.with_workers(1).percentile_interval(&data, median, &mut rng).unwrap();
//!
//! assert_eq!(a, b);
//! assert!(a.lower <= a.upper);
//! ```

use std::thread;

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::percentiles::compute_percentile;

/// Number of replicates generated from one chunk seed.
pub const CHUNK_SIZE: usize = 1000;

/// Default number of bootstrap replicates.
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Default confidence level.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

type ChunkSeed = <Pcg32 as rand::SeedableRng>::Seed;

/// Percentile bootstrap configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bootstrap {
    /// Number of resamples.
    pub iterations: usize,
    /// Number of worker threads. Zero is treated as one.
    pub workers: usize,
    /// Two-sided confidence level in `(0, 1)`.
    pub confidence: f64,
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

/// Percentile confidence interval produced by [`Bootstrap::percentile_interval`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapInterval {
    /// Lower percentile of the replicate distribution.
    pub lower: f64,
    /// Upper percentile of the replicate distribution.
    pub upper: f64,
    /// Replicates whose statistic was defined.
    pub defined: usize,
    /// Replicates drawn.
    pub iterations: usize,
}

impl Bootstrap {
    /// Creates a configuration with the default confidence level and one
    /// worker per available CPU.
    #[must_use]
    pub fn new(iterations: usize) -> Self {
        let workers = thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            iterations,
            workers,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    #[must_use]
    pub fn with_workers(self, workers: usize) -> Self {
        Self { workers, ..self }
    }

    #[must_use]
    pub fn with_confidence(self, confidence: f64) -> Self {
        Self { confidence, ..self }
    }

    /// Computes a percentile interval of `statistic` over resamples of `data`.
    ///
    /// Each replicate draws `data.len()` values with replacement. Replicates
    /// for which `statistic` returns `None` (or NaN) are skipped.
    ///
    /// Returns `None` when `data` is empty, no iterations are requested, or no
    /// replicate produced a defined statistic.
    pub fn percentile_interval<R, F>(
        &self,
        data: &[f64],
        statistic: F,
        rng: &mut R,
    ) -> Option<BootstrapInterval>
    where
        R: Rng + ?Sized,
        F: Fn(&[f64]) -> Option<f64> + Sync,
    {
        if data.is_empty() || self.iterations == 0 {
            return None;
        }

        let chunk_count = self.iterations.div_ceil(CHUNK_SIZE);
        let seeds = (0..chunk_count)
            .map(|_| rng.random::<ChunkSeed>())
            .collect::<Vec<_>>();
        let sizes = (0..chunk_count)
            .map(|i| usize::min(CHUNK_SIZE, self.iterations - i * CHUNK_SIZE))
            .collect::<Vec<_>>();
        let mut replicates = vec![Vec::new(); chunk_count];

        let per_worker = chunk_count.div_ceil(self.workers.max(1));
        thread::scope(|s| {
            for ((slots, seeds), sizes) in replicates
                .chunks_mut(per_worker)
                .zip(seeds.chunks(per_worker))
                .zip(sizes.chunks(per_worker))
            {
                let statistic = &statistic;
                s.spawn(move || {
                    for ((slot, seed), size) in slots.iter_mut().zip(seeds).zip(sizes) {
                        *slot = run_chunk(data, statistic, *seed, *size);
                    }
                });
            }
        });

        let mut values = replicates.into_iter().flatten().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let alpha = 1.0 - self.confidence;
        Some(BootstrapInterval {
            lower: compute_percentile(&values, alpha / 2.0 * 100.0),
            upper: compute_percentile(&values, (1.0 - alpha / 2.0) * 100.0),
            defined: values.len(),
            iterations: self.iterations,
        })
    }
}

fn run_chunk<F>(data: &[f64], statistic: &F, seed: ChunkSeed, size: usize) -> Vec<f64>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut rng = Pcg32::from_seed(seed);
    let mut sample = vec![0.0; data.len()];
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        for slot in &mut sample {
            *slot = data[rng.random_range(0..data.len())];
        }
        if let Some(value) = statistic(sample.as_slice()).filter(|v| !v.is_nan()) {
            out.push(value);
        }
    }
    out
}
