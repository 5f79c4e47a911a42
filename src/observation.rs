//! Append-only observation history with a running best value.

use crate::collaborator::Objective;
use crate::error::{Collaborator, Error, Result};
use crate::types::Direction;

/// All evaluated points and values, plus the best-so-far history.
///
/// [`best_history`](Self::best_history) holds one entry per observation,
/// initial batch included: entry `i` is the best of the first `i + 1`
/// values.
///
/// # Examples
///
/// ```
/// use bayesopt::Direction;
/// use bayesopt::observation::ObservationStore;
///
/// let mut store = ObservationStore::new(
///     1,
///     Direction::Maximize,
///     vec![vec![0.1], vec![0.9]],
///     vec![1.0, 3.0],
/// )
/// .unwrap();
/// store.append(vec![0.5], 2.0).unwrap();
/// assert_eq!(store.best_value(), 3.0);
/// assert_eq!(store.best_history(), &[1.0, 3.0, 3.0]);
/// ```
#[derive(Clone, Debug)]
pub struct ObservationStore {
    dim: usize,
    direction: Direction,
    points: Vec<Vec<f64>>,
    values: Vec<f64>,
    best_index: usize,
    best_history: Vec<f64>,
}

impl ObservationStore {
    /// Create a store from an already evaluated initial batch.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if `dim` is zero.
    /// - [`Error::EmptyInitialBatch`] if `points` is empty.
    /// - [`Error::BatchLengthMismatch`] if `points` and `values` differ in length.
    /// - [`Error::DimensionMismatch`] if any point does not have `dim` coordinates.
    /// - [`Error::CollaboratorFailure`] if any value is NaN or infinite.
    pub fn new(
        dim: usize,
        direction: Direction,
        points: Vec<Vec<f64>>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidDimension);
        }
        if points.is_empty() {
            return Err(Error::EmptyInitialBatch);
        }
        if points.len() != values.len() {
            return Err(Error::BatchLengthMismatch {
                points: points.len(),
                values: values.len(),
            });
        }
        if let Some(bad) = points.iter().find(|p| p.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: bad.len(),
            });
        }
        for &v in &values {
            check_value(v)?;
        }

        let mut best_index = 0;
        let mut best_history = Vec::with_capacity(values.len());
        for (i, &v) in values.iter().enumerate() {
            if direction.is_better(v, values[best_index]) {
                best_index = i;
            }
            best_history.push(values[best_index]);
        }

        Ok(Self {
            dim,
            direction,
            points,
            values,
            best_index,
            best_history,
        })
    }

    /// Evaluate `points` with `objective` and create a store from the results.
    ///
    /// # Errors
    ///
    /// Everything [`new`](Self::new) returns, plus
    /// [`Error::CollaboratorFailure`] if the objective fails.
    pub fn initialize<O: Objective>(
        dim: usize,
        direction: Direction,
        points: Vec<Vec<f64>>,
        objective: &mut O,
    ) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| p.len() != dim) {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: bad.len(),
            });
        }
        let values = objective
            .evaluate(&points)
            .map_err(|e| Error::collaborator(Collaborator::Objective, e))?;
        Self::new(dim, direction, points, values)
    }

    /// Append one observation and update the running best in O(1).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `point` does not have `dim`
    /// coordinates, or [`Error::CollaboratorFailure`] if `value` is not
    /// finite. The store is left unchanged on error.
    pub fn append(&mut self, point: Vec<f64>, value: f64) -> Result<()> {
        if point.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: point.len(),
            });
        }
        check_value(value)?;
        if self.direction.is_better(value, self.best_value()) {
            self.best_index = self.values.len();
        }
        self.points.push(point);
        self.values.push(value);
        self.best_history.push(self.best_value());
        Ok(())
    }

    /// The best observed value under the store's direction.
    #[must_use]
    pub fn best_value(&self) -> f64 {
        self.values[self.best_index]
    }

    /// The point at which [`best_value`](Self::best_value) was observed.
    #[must_use]
    pub fn best_point(&self) -> &[f64] {
        &self.points[self.best_index]
    }

    /// Best-so-far after every observation, oldest first.
    #[must_use]
    pub fn best_history(&self) -> &[f64] {
        &self.best_history
    }

    /// Gap to a known optimum for every entry of the best history.
    ///
    /// `optimum - best` when maximizing, `best - optimum` when minimizing.
    #[must_use]
    pub fn regret_history(&self, global_optimum: f64) -> Vec<f64> {
        self.best_history
            .iter()
            .map(|&best| match self.direction {
                Direction::Maximize => global_optimum - best,
                Direction::Minimize => best - global_optimum,
            })
            .collect()
    }

    /// All evaluated points, oldest first.
    #[must_use]
    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    /// All observed values, aligned with [`points`](Self::points).
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of evaluated points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a store holds at least its initial batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimension of every stored point.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Optimization direction used to rank values.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Reject objective values that would poison the running best.
///
/// A NaN incumbent never compares worse than anything, so it would stick.
pub(crate) fn check_value(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::collaborator(
            Collaborator::Objective,
            format!("returned non-finite value {value}"),
        ))
    }
}
