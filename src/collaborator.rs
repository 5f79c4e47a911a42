//! Contracts for the numeric collaborators the controller drives.
//!
//! The controller owns none of the numerics. Each step it asks a
//! [`SurrogateFit`] for a model, an [`Acquisition`] evaluator for the
//! scoring function described by the selected
//! [`AcquisitionParams`], a [`Maximizer`] for the best point of that
//! function over the unit hypercube, and finally the [`Objective`] for the
//! value at that point.
//!
//! Closures implement [`SurrogateFit`] and [`Objective`] directly:
//!
//! ```
//! use bayesopt::collaborator::{Objective, Surrogate, SurrogateFit};
//!
//! struct Flat;
//! impl Surrogate for Flat {
//!     fn posterior_mean_and_uncertainty(&self, _x: &[f64]) -> (f64, f64) {
//!         (0.0, 1.0)
//!     }
//! }
//!
//! let fit = |_x: &[Vec<f64>], _y: &[f64]| Ok::<_, String>(Flat);
//! assert!(fit.fit(&[vec![0.5]], &[1.0]).is_ok());
//!
//! let mut objective = |points: &[Vec<f64>]| {
//!     Ok::<_, String>(points.iter().map(|p| p[0] * 2.0).collect::<Vec<f64>>())
//! };
//! assert_eq!(objective.evaluate(&[vec![0.25]]).unwrap(), vec![0.5]);
//! ```

use core::convert::Infallible;

use crate::acquisition::AcquisitionParams;
use crate::types::Bounds;

/// A fitted probabilistic model of the objective.
pub trait Surrogate {
    /// Posterior mean and standard deviation at `x`.
    fn posterior_mean_and_uncertainty(&self, x: &[f64]) -> (f64, f64);
}

/// Fits a [`Surrogate`] to all observations so far.
///
/// Called once per controller step with the full history. Determinism is not
/// required.
pub trait SurrogateFit {
    /// The fitted model type.
    type Model: Surrogate;
    /// Error reported when fitting fails.
    type Error: ToString;

    /// Fit a model to `points` and their `values`.
    ///
    /// # Errors
    ///
    /// Any fitting failure. The controller aborts the run.
    fn fit(&self, points: &[Vec<f64>], values: &[f64]) -> Result<Self::Model, Self::Error>;
}

impl<F, M, E> SurrogateFit for F
where
    F: Fn(&[Vec<f64>], &[f64]) -> Result<M, E>,
    M: Surrogate,
    E: ToString,
{
    type Model = M;
    type Error = E;

    fn fit(&self, points: &[Vec<f64>], values: &[f64]) -> Result<M, E> {
        self(points, values)
    }
}

/// Evaluates acquisition functions from their assembled parameters.
///
/// Implementations hold the acquisition formulas (expected improvement,
/// cost-weighted improvement, Gittins index, or anything named by
/// [`AcquisitionParams::Other`]).
pub trait Acquisition<M> {
    /// Acquisition value at `x`. Larger is better.
    fn evaluate(&self, params: &AcquisitionParams<'_, M>, x: &[f64]) -> f64;
}

/// Maximizes a scalar function over a box.
pub trait Maximizer {
    /// Error reported when no maximum can be produced.
    type Error: ToString;

    /// Return the best point found and the function value attained there.
    ///
    /// # Errors
    ///
    /// Any optimizer failure. The controller aborts the run.
    fn maximize(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        bounds: &Bounds,
        num_restarts: usize,
        raw_samples: usize,
    ) -> Result<(Vec<f64>, f64), Self::Error>;
}

/// The expensive black-box function being optimized.
pub trait Objective {
    /// Error reported when evaluation fails.
    type Error: ToString;

    /// Evaluate a batch of points, returning one value per point.
    ///
    /// # Errors
    ///
    /// Any evaluation failure. The controller aborts the run.
    fn evaluate(&mut self, points: &[Vec<f64>]) -> Result<Vec<f64>, Self::Error>;
}

impl<F, E> Objective for F
where
    F: FnMut(&[Vec<f64>]) -> Result<Vec<f64>, E>,
    E: ToString,
{
    type Error = E;

    fn evaluate(&mut self, points: &[Vec<f64>]) -> Result<Vec<f64>, E> {
        self(points)
    }
}

/// Adapter turning an infallible per-point function into an [`Objective`].
///
/// ```
/// use bayesopt::collaborator::{Objective, pointwise};
///
/// let mut sphere = pointwise(|x: &[f64]| x.iter().map(|v| v * v).sum());
/// let values = sphere.evaluate(&[vec![1.0, 2.0], vec![0.0, 0.0]]).unwrap();
/// assert_eq!(values, vec![5.0, 0.0]);
/// ```
pub fn pointwise<F>(f: F) -> Pointwise<F>
where
    F: FnMut(&[f64]) -> f64,
{
    Pointwise(f)
}

/// See [`pointwise`].
pub struct Pointwise<F>(F);

impl<F> Objective for Pointwise<F>
where
    F: FnMut(&[f64]) -> f64,
{
    type Error = Infallible;

    fn evaluate(&mut self, points: &[Vec<f64>]) -> Result<Vec<f64>, Infallible> {
        Ok(points.iter().map(|p| (self.0)(p)).collect())
    }
}
