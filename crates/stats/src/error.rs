//! Statistics layer errors.

use thiserror::Error;

/// Errors raised by the aggregation functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// An aggregation was asked to run over no data.
    #[error("empty input: {0}")]
    Empty(&'static str),

    /// The factorial table is not a full balanced a x b grid.
    #[error("factorial design is not balanced: {0}")]
    Unbalanced(String),

    /// A factor needs at least two levels for the decomposition.
    #[error("factor {factor} needs at least two levels")]
    TooFewLevels {
        /// Which factor is degenerate.
        factor: &'static str,
    },

    /// Sampled series disagree on horizon length.
    #[error("series length mismatch: {0}")]
    LengthMismatch(String),
}
