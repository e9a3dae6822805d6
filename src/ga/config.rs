//! GA configuration.
//!
//! [`GaConfig`] holds every tunable of the evolutionary loop. The defaults
//! are the ones the search was tuned with; they live here rather than as
//! scattered constants so the runner receives one immutable value.

use crate::error::NpStackError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for the box-stack genetic algorithm.
///
/// # Defaults
///
/// ```
/// use npstack::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 1000);
/// assert_eq!(config.settle_threshold, 200);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use npstack::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_solution_budget(10_000)
///     .with_mutation_rate(0.2)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaConfig {
    /// Number of stacks held in each generation.
    pub population_size: usize,

    /// Total stack constructions the run may spend. The number of epochs is
    /// `solution_budget / population_size` (integer division), so the budget
    /// must be at least one full population.
    pub solution_budget: u64,

    /// Fraction of the population carried over unchanged each cycle
    /// (elitism). Parents are also drawn from this ranked survivor range.
    pub survival_rate: f64,

    /// Probability that a freshly bred child is mutated against a clone of
    /// the master box list.
    pub mutation_rate: f64,

    /// Fraction of a converged population replaced by fresh stacks during a
    /// diversity reset.
    pub reset_removal_rate: f64,

    /// Exponent of the rank-biased parent selection
    /// (`index = floor(max * u^exponent)`, `u` uniform in `[0, 1)`).
    /// Must be greater than 1 so lower (fitter) indices are favored.
    pub selection_exponent: f64,

    /// Factor applied to the mutation rate after each diversity reset,
    /// easing the search toward convergence.
    pub mutation_decay: f64,

    /// Number of consecutive diversity resets landing on the same peak
    /// height before the population is considered settled and the run stops
    /// early.
    pub settle_threshold: usize,

    /// Whether to build offspring in parallel using rayon.
    ///
    /// Ranking and elitism stay deterministic either way: parent pairs and
    /// per-child seeds are drawn sequentially, children are collected in
    /// order, and the merged generation is sorted once.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            solution_budget: 1000,
            survival_rate: 0.2,
            mutation_rate: 0.1,
            reset_removal_rate: 0.99,
            selection_exponent: 1.1,
            mutation_decay: 0.9,
            settle_threshold: 200,
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the total solution budget.
    pub fn with_solution_budget(mut self, budget: u64) -> Self {
        self.solution_budget = budget;
        self
    }

    /// Sets the survivor (elite) fraction.
    pub fn with_survival_rate(mut self, rate: f64) -> Self {
        self.survival_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the fraction of the population replaced on a diversity reset.
    pub fn with_reset_removal_rate(mut self, rate: f64) -> Self {
        self.reset_removal_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the selection bias exponent.
    pub fn with_selection_exponent(mut self, exponent: f64) -> Self {
        self.selection_exponent = exponent;
        self
    }

    /// Sets the per-reset mutation decay factor.
    pub fn with_mutation_decay(mut self, decay: f64) -> Self {
        self.mutation_decay = decay.clamp(0.0, 1.0);
        self
    }

    /// Sets the early-settle threshold.
    pub fn with_settle_threshold(mut self, threshold: usize) -> Self {
        self.settle_threshold = threshold;
        self
    }

    /// Enables or disables parallel offspring construction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of evolutionary cycles the budget pays for.
    pub fn epochs(&self) -> u64 {
        self.solution_budget / self.population_size as u64
    }

    /// Number of top-ranked stacks carried over unchanged each cycle.
    pub fn survivors(&self) -> usize {
        (self.population_size as f64 * self.survival_rate) as usize
    }

    /// Validates the configuration.
    ///
    /// Returns `Err(NpStackError::Config)` with a description if any
    /// parameter is invalid.
    pub fn validate(&self) -> Result<(), NpStackError> {
        if self.population_size < 2 {
            return Err(NpStackError::Config(
                "population_size must be at least 2".into(),
            ));
        }
        if self.solution_budget < self.population_size as u64 {
            return Err(NpStackError::Config(format!(
                "solution budget must be >= population size ({}), got {}",
                self.population_size, self.solution_budget
            )));
        }
        if self.survivors() < 2 {
            return Err(NpStackError::Config(
                "survival_rate too low: need at least 2 survivors to breed".into(),
            ));
        }
        if self.survivors() >= self.population_size {
            return Err(NpStackError::Config(
                "survival_rate too high: survivors fill the entire population".into(),
            ));
        }
        if self.selection_exponent <= 1.0 {
            return Err(NpStackError::Config(
                "selection_exponent must be greater than 1".into(),
            ));
        }
        Ok(())
    }
}
