use core::fmt;

/// The external collaborator that reported a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collaborator {
    /// The surrogate-model fit.
    SurrogateFit,
    /// The continuous acquisition maximizer.
    Maximizer,
    /// The black-box objective evaluator.
    Objective,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SurrogateFit => "surrogate fit",
            Self::Maximizer => "acquisition maximizer",
            Self::Objective => "objective",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a point's length disagrees with the configured dimension.
    #[error("dimension mismatch: expected {expected} coordinates but got {got}")]
    DimensionMismatch {
        /// The configured dimension.
        expected: usize,
        /// The length of the offending point.
        got: usize,
    },

    /// Returned when a cost model yields a negative or non-finite cost,
    /// or a constant cost is not strictly positive.
    #[error("invalid cost: {0} (costs must be finite and non-negative, constant costs positive)")]
    InvalidCost(f64),

    /// Returned in strict policy mode for an unrecognized policy name.
    #[error("unknown acquisition policy '{0}'")]
    UnknownPolicy(String),

    /// Returned when a surrogate fit, maximizer, or objective evaluation fails.
    #[error("{collaborator} failed: {reason}")]
    CollaboratorFailure {
        /// Which collaborator failed.
        collaborator: Collaborator,
        /// The collaborator's own error message.
        reason: String,
    },

    /// Returned when the initial batch contains no points.
    #[error("initial batch must contain at least one point")]
    EmptyInitialBatch,

    /// Returned when the objective returns a different number of values than points.
    #[error("batch length mismatch: {points} points but {values} values")]
    BatchLengthMismatch {
        /// Number of points in the batch.
        points: usize,
        /// Number of values returned.
        values: usize,
    },

    /// Returned when policy options are missing, contradictory, or out of range.
    #[error("invalid policy options: {0}")]
    InvalidPolicyOptions(String),

    /// Returned when a cost budget is not positive and finite.
    #[error("invalid budget: {0} must be positive and finite")]
    InvalidBudget(f64),

    /// Returned when the search-space dimension is zero.
    #[error("search space dimension must be at least 1")]
    InvalidDimension,
}

impl Error {
    pub(crate) fn collaborator(collaborator: Collaborator, reason: impl ToString) -> Self {
        Self::CollaboratorFailure {
            collaborator,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
