//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete search: initial population →
//! ranking → elitist breeding → convergence detection / diversity reset →
//! final audit of the winning stack.

use crate::boxes::BoxItem;
use crate::error::NpStackError;
use crate::ga::config::GaConfig;
use crate::ga::selection::RankBias;
use crate::stack::{randomise_boxes, BoxStack};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The winning stack, deduplicated and audited.
    pub best: BoxStack,

    /// Height of the winning stack (same as `best.height()`).
    pub best_height: u64,

    /// Number of evolutionary cycles executed, including the initial
    /// generation and any budget charged to diversity resets.
    pub generations: u64,

    /// Whether the run stopped early because the population settled on the
    /// same peak height across consecutive diversity resets.
    pub settled: bool,

    /// Best height at the end of each cycle.
    pub height_history: Vec<u64>,
}

/// Executes the evolutionary loop.
///
/// # Usage
///
/// ```
/// use npstack::boxes::BoxItem;
/// use npstack::ga::{GaConfig, GaRunner};
///
/// let boxes = vec![
///     BoxItem::new(5, 1, 5),
///     BoxItem::new(4, 1, 4),
///     BoxItem::new(3, 1, 3),
/// ];
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_solution_budget(400)
///     .with_survival_rate(0.2)
///     .with_seed(42)
///     .with_parallel(false);
/// let result = GaRunner::run(&boxes, &config).unwrap();
/// assert!(result.best_height >= 3);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the search over `boxes` with the given configuration.
    ///
    /// The master box list is read-only; every population member and every
    /// mutation pool works on its own clone. Returns an error for an invalid
    /// configuration, an empty box list, or — never expected in correct
    /// operation — an audit failure on the winning stack.
    pub fn run(boxes: &[BoxItem], config: &GaConfig) -> Result<GaResult, NpStackError> {
        config.validate()?;
        if boxes.is_empty() {
            return Err(NpStackError::Config(
                "box list is empty: no valid boxes were read".into(),
            ));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let mut engine = Engine {
            boxes,
            config,
            bias: RankBias::new(config.selection_exponent),
            mutation_rate: config.mutation_rate,
            rng,
            generation: Vec::new(),
            old_peak: 0,
            same_peaks: 0,
        };

        // Initial generation: every member is built from its own reoriented
        // and shuffled clone of the master list, without roll-over.
        engine.generation = engine.fresh_population(config.population_size);
        engine.rank();
        // Observed for the peak counters, but never triggers a reset before
        // the first steady-state cycle.
        engine.observe_convergence();

        let mut height_history = vec![engine.best_height()];
        let epochs = config.epochs();
        let mut epoch = 1u64;
        let mut settled = false;

        while epoch < epochs {
            engine.next_generation();
            height_history.push(engine.best_height());

            if engine.observe_convergence() {
                engine.reset_population();
                // A reset rebuilds most of a full generation of stacks, so
                // it is charged against the solution budget as one epoch.
                epoch += 1;
            }

            if engine.same_peaks >= config.settle_threshold {
                log::info!(
                    "population settled at height {} after {} cycles",
                    engine.old_peak,
                    epoch
                );
                settled = true;
                epoch += 1;
                break;
            }

            epoch += 1;
        }

        let mut best = engine
            .generation
            .into_iter()
            .next()
            .expect("generation is never empty");
        best.remove_duplicates();
        best.audit()?;

        Ok(GaResult {
            best_height: best.height(),
            best,
            generations: epoch,
            settled,
            height_history,
        })
    }
}

/// Mutable state of one run. Separate from [`GaRunner`] so the public
/// surface stays a single `run` call.
struct Engine<'a> {
    boxes: &'a [BoxItem],
    config: &'a GaConfig,
    bias: RankBias,
    /// Current mutation probability; decays on every diversity reset.
    mutation_rate: f64,
    rng: StdRng,
    /// Ranked, fittest first.
    generation: Vec<BoxStack>,
    old_peak: u64,
    same_peaks: usize,
}

impl Engine<'_> {
    /// Builds `count` fresh stacks, each from an independently randomized
    /// clone of the master list.
    ///
    /// Per-member seeds are drawn sequentially from the master RNG before
    /// any work is parallelized, so sequential and parallel runs with the
    /// same seed build identical populations.
    fn fresh_population(&mut self, count: usize) -> Vec<BoxStack> {
        let seeds: Vec<u64> = (0..count).map(|_| self.rng.random()).collect();
        let boxes = self.boxes;

        let build = move |seed: &u64| {
            let mut rng = StdRng::seed_from_u64(*seed);
            let candidates = randomise_boxes(boxes, &mut rng);
            BoxStack::construct(candidates, false)
        };

        if self.config.parallel {
            seeds.par_iter().map(build).collect()
        } else {
            seeds.iter().map(build).collect()
        }
    }

    /// One steady-state transition: carry the ranked survivors unchanged,
    /// fill the remaining slots with bred (and possibly mutated) children,
    /// then re-rank the merged generation.
    fn next_generation(&mut self) {
        let survivors = self.config.survivors();
        let child_count = self.config.population_size - survivors;

        // Parent pairs and child seeds come from the master RNG up front;
        // the breeding itself is then order-independent.
        let jobs: Vec<(usize, usize, u64)> = (0..child_count)
            .map(|_| {
                let (a, b) = self.bias.pick_pair(survivors, &mut self.rng);
                (a, b, self.rng.random())
            })
            .collect();

        let generation = &self.generation;
        let boxes = self.boxes;
        let mutation_rate = self.mutation_rate;

        let breed_one = move |&(a, b, seed): &(usize, usize, u64)| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut child = generation[a].breed(&generation[b], &mut rng);
            if rng.random_range(0.0..1.0) < mutation_rate {
                let mut pool = boxes.to_vec();
                child.mutate(&mut pool);
            }
            child
        };

        let mut next: Vec<BoxStack> = if self.config.parallel {
            jobs.par_iter().map(breed_one).collect()
        } else {
            jobs.iter().map(breed_one).collect()
        };

        next.extend_from_slice(&self.generation[..survivors]);
        self.generation = next;
        self.rank();
    }

    /// Diversity reset: most of the converged population is replaced by
    /// fresh stacks, the top remainder survives, and the mutation rate
    /// decays a step.
    fn reset_population(&mut self) {
        let replaced =
            (self.config.population_size as f64 * self.config.reset_removal_rate) as usize;
        let kept = self.config.population_size - replaced;

        log::info!(
            "population collapsed to height {}; regenerating {replaced} members",
            self.old_peak
        );

        let mut next = self.fresh_population(replaced);
        next.extend_from_slice(&self.generation[..kept]);
        self.generation = next;
        self.rank();

        self.mutation_rate *= self.config.mutation_decay;
    }

    /// Sorts the generation fittest first.
    fn rank(&mut self) {
        self.generation.sort_by(BoxStack::cmp_fitness);
    }

    fn best_height(&self) -> u64 {
        self.generation.first().map_or(0, BoxStack::height)
    }

    /// Logs generation statistics and updates the settle counters.
    ///
    /// Returns whether the population has collapsed to a single height
    /// (best == worst), which is the trigger for a diversity reset.
    fn observe_convergence(&mut self) -> bool {
        let n = self.generation.len();
        let max_height = self.best_height();
        let min_height = self.generation.last().map_or(0, BoxStack::height);

        if log::log_enabled!(log::Level::Debug) {
            let total_height: u64 = self.generation.iter().map(BoxStack::height).sum();
            let total_boxes: usize = self.generation.iter().map(BoxStack::len).sum();
            log::debug!(
                "generation stats: avg height {} avg boxes {} max {} min {}",
                total_height / n as u64,
                total_boxes / n,
                max_height,
                min_height
            );
        }

        if min_height == max_height {
            if self.old_peak == max_height {
                self.same_peaks += 1;
            } else {
                self.old_peak = max_height;
                self.same_peaks = 0;
            }
            return true;
        }
        false
    }
}
