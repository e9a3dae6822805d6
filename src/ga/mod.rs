//! Genetic algorithm over box stacks.
//!
//! The population manager: ranks a generation of [`BoxStack`]s, breeds the
//! next one from rank-biased parents with elitism, detects convergence, and
//! injects diversity when the population collapses.
//!
//! # Key Types
//!
//! - [`GaConfig`]: all tunables (population size, rates, thresholds, seed)
//! - [`GaRunner`]: executes the evolutionary loop
//! - [`GaResult`]: winning stack plus run statistics
//! - [`RankBias`]: power-law parent index sampling
//!
//! [`BoxStack`]: crate::stack::BoxStack

mod config;
mod runner;
mod selection;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner};
pub use selection::RankBias;
