//! Statistical building blocks for Tierscope survey analysis.
//!
//! This crate is independent of any survey schema. It works on plain `f64`
//! slices and provides:
//!
//! - **Descriptive statistics**: mean, median, quartiles, sample variance
//! - **Reliability**: Cronbach's alpha for item matrices
//! - **Rank tests**: Wilcoxon signed-rank, Mann–Whitney U, Friedman and Kruskal–Wallis
//! - **Corrections and intervals**: Bonferroni adjustment, Student-t intervals
//! - **Robust dispersion**: median absolute deviation relative to the median
//! - **Bootstrap**: seeded, parallel percentile intervals
//!
//! # Modules
//!
//! - [`descriptive`]: Summary statistics for a dataset
//! - [`percentiles`]: Percentile and median computation
//! - [`rank`]: Average ranking with tie bookkeeping
//! - [`distribution`]: Tail probabilities and quantiles of reference distributions
//! - [`reliability`]: Cronbach's alpha
//! - [`signed_rank`]: Paired two-sample test
//! - [`rank_sum`]: Independent two-sample test
//! - [`omnibus`]: Tests across three or more groups
//! - [`correction`]: Multiple-comparison adjustment
//! - [`interval`]: Parametric confidence intervals
//! - [`dispersion`]: MAD-based dispersion
//! - [`bootstrap`]: Percentile bootstrap
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use tierscope_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.median, 3.0);
//! ```
//!
//! ## Comparing paired samples
//!
//! ```
//! use tierscope_stats::signed_rank::wilcoxon_signed_rank;
//!
//! let ai = [4.0, 5.0, 3.0, 4.0];
//! let human = [3.0, 3.0, 2.0, 2.0];
//! let test = wilcoxon_signed_rank(&ai, &human).unwrap();
//! assert_eq!(test.statistic, 0.0);
//! ```

pub mod bootstrap;
pub mod correction;
pub mod descriptive;
pub mod dispersion;
pub mod distribution;
pub mod interval;
pub mod omnibus;
pub mod percentiles;
pub mod rank;
pub mod rank_sum;
pub mod reliability;
pub mod signed_rank;

/// Reasons a hypothesis test cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum TestError {
    #[display("samples differ in length")]
    LengthMismatch,
    #[display("not enough observations")]
    InsufficientData,
    #[display("not enough groups")]
    TooFewGroups,
    #[display("all observations are tied")]
    AllTied,
}
