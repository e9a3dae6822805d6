//! Error taxonomy for the stack optimizer.
//!
//! Three fatal categories: bad configuration, box-file I/O failure, and a
//! structural audit violation on the final stack. Malformed input lines are
//! not errors at all — the parser skips them locally (see [`crate::io`]).

use crate::boxes::BoxItem;
use thiserror::Error;

/// Fatal errors surfaced by the optimizer.
#[derive(Debug, Error)]
pub enum NpStackError {
    /// Invalid tunables, e.g. a solution budget below the population size.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The box-list file could not be read.
    #[error("failed to read box file: {0}")]
    Io(#[from] std::io::Error),

    /// The final stack violates the strict-shrink rule.
    ///
    /// This is a defect signal: construction, crossover, and mutation must
    /// only ever produce valid stacks, so an audit failure means a bug in the
    /// optimizer, not bad input.
    #[error(
        "stack audit failed at position {position}: box {upper} does not fit \
         strictly inside box {lower} beneath it"
    )]
    AuditViolation {
        /// Index (from the bottom) of the upper box of the offending pair.
        position: usize,
        /// The box beneath.
        lower: BoxItem,
        /// The box resting on it.
        upper: BoxItem,
    },
}
