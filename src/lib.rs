//! Genetic-algorithm search for the tallest strictly-shrinking box stack.
//!
//! Given a list of rectangular boxes, the optimizer looks for a tall stack in
//! which every box's footprint lies strictly inside the footprint of the box
//! beneath it (no touching or overhanging faces), each physical box is used
//! at most once, and every box may be freely reoriented before placement.
//!
//! The search is a stochastic heuristic, not an exact solver: greedy stack
//! construction drives a generational GA with elitism, rank-biased parent
//! selection, gap-insertion mutation, and diversity resets on convergence.
//! The result is always a structurally valid stack — the winning stack is
//! deduplicated and audited before it is returned — but carries no
//! optimality guarantee.
//!
//! # Layers
//!
//! - [`boxes`]: the box value type, orientation operations, and the fit test
//! - [`stack`]: greedy construction, crossover, mutation, dedup, audit
//! - [`ga`]: configuration and the evolutionary loop
//! - [`io`]: box-list file parsing
//!
//! # Quick Start
//!
//! ```
//! use npstack::boxes::BoxItem;
//! use npstack::ga::{GaConfig, GaRunner};
//!
//! let boxes = vec![
//!     BoxItem::new(5, 1, 5),
//!     BoxItem::new(4, 1, 4),
//!     BoxItem::new(3, 1, 3),
//!     BoxItem::new(2, 1, 2),
//! ];
//! let config = GaConfig::default()
//!     .with_population_size(50)
//!     .with_solution_budget(2_000)
//!     .with_seed(42);
//! let result = GaRunner::run(&boxes, &config).expect("valid configuration");
//! println!("{}", result.best);
//! assert!(result.best_height >= 4);
//! ```

pub mod boxes;
pub mod error;
pub mod ga;
pub mod io;
pub mod stack;

pub use boxes::BoxItem;
pub use error::NpStackError;
pub use ga::{GaConfig, GaResult, GaRunner};
pub use stack::BoxStack;
