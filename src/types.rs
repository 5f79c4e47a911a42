//! Search direction, search space, budgets and run states shared by the controller.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The direction of optimization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Minimize the objective value.
    Minimize,
    /// Maximize the objective value.
    Maximize,
}

impl Direction {
    /// Returns `true` when maximizing.
    #[must_use]
    pub fn is_maximize(self) -> bool {
        matches!(self, Self::Maximize)
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[must_use]
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Maximize => candidate > incumbent,
            Self::Minimize => candidate < incumbent,
        }
    }

    /// Returns the better of two values.
    #[must_use]
    pub fn best_of(self, a: f64, b: f64) -> f64 {
        if self.is_better(b, a) { b } else { a }
    }
}

/// Box-shaped search space. The controller always searches the unit hypercube.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// The unit hypercube `[0, 1]^dim`.
    #[must_use]
    pub fn unit(dim: usize) -> Self {
        Self {
            lower: vec![0.0; dim],
            upper: vec![1.0; dim],
        }
    }

    /// Number of dimensions.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Lower corner.
    #[must_use]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Upper corner.
    #[must_use]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Clamp `x` into the box in place.
    pub fn clamp(&self, x: &mut [f64]) {
        for ((xi, &lo), &hi) in x.iter_mut().zip(&self.lower).zip(&self.upper) {
            *xi = xi.clamp(lo, hi);
        }
    }

    /// Returns `true` if every coordinate of `x` lies inside the box.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(&self.lower)
                .zip(&self.upper)
                .all(|((xi, lo), hi)| (lo..=hi).contains(&xi))
    }
}

/// Stopping condition of a single run. Set once and immutable for that run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Budget {
    /// Stop after a fixed number of controller steps.
    Iterations(usize),
    /// Stop once the cumulative cost reaches this ceiling.
    Cost(f64),
}

impl Budget {
    pub(crate) fn validate(self) -> Result<Self> {
        match self {
            Self::Cost(b) if !(b.is_finite() && b > 0.0) => Err(Error::InvalidBudget(b)),
            _ => Ok(self),
        }
    }

    /// Whether the run must stop before starting step `step` (0-based).
    ///
    /// The cost ceiling is checked before each step, so a run can overshoot
    /// it by at most the cost of its final step.
    #[must_use]
    pub fn should_stop(self, step: usize, cumulative_cost: f64) -> bool {
        match self {
            Self::Iterations(n) => step >= n,
            Self::Cost(budget) => cumulative_cost >= budget,
        }
    }

    /// Whether every step must be charged a positive cost for the run to end.
    #[must_use]
    pub fn requires_progress(self) -> bool {
        matches!(self, Self::Cost(_))
    }

    /// The budget figure used for cost cooling.
    ///
    /// For iteration budgets this is the iteration count itself.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cooling_total(self) -> f64 {
        match self {
            Self::Iterations(n) => n as f64,
            Self::Cost(budget) => budget,
        }
    }

    /// The terminal state reached when this budget stops the run.
    #[must_use]
    pub fn terminal_state(self) -> RunState {
        match self {
            Self::Iterations(_) => RunState::Completed,
            Self::Cost(_) => RunState::Exhausted,
        }
    }
}

/// Lifecycle of the optimization controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunState {
    /// Initial batch evaluated, no run started.
    Idle,
    /// A run is in progress, or the last run aborted on an error.
    Running,
    /// The last run performed its fixed number of steps.
    Completed,
    /// The last run stopped because the cost budget was exhausted.
    Exhausted,
}
