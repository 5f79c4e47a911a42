//! A derivative-free acquisition maximizer.
//!
//! [`CandidateSearchMaximizer`] is the stock [`Maximizer`] shipped with the
//! crate. It is deliberately simple and needs nothing from the acquisition
//! function beyond point evaluations:
//!
//! 1. Evaluate `raw_samples` candidates spread over the box (uniform random,
//!    or scrambled Sobol with the **`sobol`** feature).
//! 2. Keep the best `num_restarts` of them as starting points.
//! 3. Refine every start with a local perturbation search whose step
//!    shrinks each time a proposal is rejected. Proposals are clamped to
//!    the box.
//! 4. Return the best point seen overall.
//!
//! Callers with gradient-based multi-start optimizers can plug those in
//! through the [`Maximizer`] trait instead.
//!
//! # Examples
//!
//! ```
//! use bayesopt::Bounds;
//! use bayesopt::collaborator::Maximizer;
//! use bayesopt::maximizer::CandidateSearchMaximizer;
//!
//! let maximizer = CandidateSearchMaximizer::with_seed(3);
//! let peak = |x: &[f64]| -(x[0] - 0.3).powi(2) - (x[1] - 0.7).powi(2);
//! let (x, value) = maximizer.maximize(&peak, &Bounds::unit(2), 4, 256).unwrap();
//! assert!((x[0] - 0.3).abs() < 0.1 && (x[1] - 0.7).abs() < 0.1);
//! assert!(value > -0.02);
//! ```

use parking_lot::Mutex;

use crate::collaborator::Maximizer;
use crate::design;
use crate::types::Bounds;

/// Default number of local refinement proposals per start.
const DEFAULT_REFINE_STEPS: usize = 64;
/// Default initial perturbation, as a fraction of each box side.
const DEFAULT_INITIAL_STEP: f64 = 0.1;
/// Default factor applied to the step after a rejected proposal.
const DEFAULT_SHRINK: f64 = 0.7;

/// Errors from [`CandidateSearchMaximizer`].
#[derive(Debug, thiserror::Error)]
pub enum MaximizerError {
    /// Returned when there is nothing to evaluate.
    #[error("no candidates to evaluate: dimension and raw_samples must be positive")]
    NoCandidates,
    /// Returned when no candidate produced a finite acquisition value.
    #[error("acquisition function produced no finite value (best was {0})")]
    NonFinite(f64),
}

/// How the raw candidates are spread over the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CandidateSampling {
    /// Independent uniform draws.
    #[default]
    Random,
    /// Scrambled Sobol sequence. Requires the **`sobol`** feature.
    #[cfg(feature = "sobol")]
    Sobol,
}

struct SearchState {
    rng: fastrand::Rng,
    #[cfg_attr(not(feature = "sobol"), allow(dead_code))]
    sobol_index: u32,
    #[cfg_attr(not(feature = "sobol"), allow(dead_code))]
    sobol_seed: u32,
}

/// Multi-start candidate search over a box.
///
/// Create with [`new`](Self::new), [`with_seed`](Self::with_seed) or
/// [`builder`](Self::builder).
pub struct CandidateSearchMaximizer {
    state: Mutex<SearchState>,
    sampling: CandidateSampling,
    refine_steps: usize,
    initial_step: f64,
    shrink: f64,
}

impl CandidateSearchMaximizer {
    /// Creates a maximizer with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a maximizer with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::builder().seed(seed).build()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> CandidateSearchMaximizerBuilder {
        CandidateSearchMaximizerBuilder::new()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn candidates(&self, n: usize, bounds: &Bounds) -> Vec<Vec<f64>> {
        let mut state = self.state.lock();
        match self.sampling {
            CandidateSampling::Random => design::random_in(&mut state.rng, n, bounds),
            #[cfg(feature = "sobol")]
            CandidateSampling::Sobol => {
                let SearchState {
                    rng,
                    sobol_index,
                    sobol_seed,
                } = &mut *state;
                let points = design::sobol_in(rng, n, *sobol_index, *sobol_seed, bounds);
                *sobol_index = sobol_index.wrapping_add(n as u32);
                points
            }
        }
    }

    /// Shrinking-step local search from `start`.
    fn refine(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        bounds: &Bounds,
        start: Vec<f64>,
        start_value: f64,
    ) -> (Vec<f64>, f64) {
        let mut state = self.state.lock();
        let widths: Vec<f64> = bounds
            .lower()
            .iter()
            .zip(bounds.upper())
            .map(|(lo, hi)| hi - lo)
            .collect();

        let mut x = start;
        let mut value = start_value;
        let mut step = self.initial_step;
        let mut proposal = x.clone();
        for _ in 0..self.refine_steps {
            for ((p, &xi), &w) in proposal.iter_mut().zip(&x).zip(&widths) {
                *p = xi + design::f64_range(&mut state.rng, -step, step) * w;
            }
            bounds.clamp(&mut proposal);
            let candidate = score(f, &proposal);
            if candidate > value {
                x.copy_from_slice(&proposal);
                value = candidate;
            } else {
                step *= self.shrink;
            }
        }
        (x, value)
    }
}

impl Default for CandidateSearchMaximizer {
    fn default() -> Self {
        Self::new()
    }
}

/// NaN ranks below everything.
fn score(f: &dyn Fn(&[f64]) -> f64, x: &[f64]) -> f64 {
    let v = f(x);
    if v.is_nan() { f64::NEG_INFINITY } else { v }
}

impl Maximizer for CandidateSearchMaximizer {
    type Error = MaximizerError;

    fn maximize(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        bounds: &Bounds,
        num_restarts: usize,
        raw_samples: usize,
    ) -> Result<(Vec<f64>, f64), MaximizerError> {
        if bounds.dim() == 0 || raw_samples == 0 {
            return Err(MaximizerError::NoCandidates);
        }

        let mut scored: Vec<(Vec<f64>, f64)> = self
            .candidates(raw_samples, bounds)
            .into_iter()
            .map(|x| {
                let v = score(f, &x);
                (x, v)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(num_restarts.clamp(1, raw_samples));

        let mut best: Option<(Vec<f64>, f64)> = None;
        for (start, start_value) in scored {
            let (x, v) = self.refine(f, bounds, start, start_value);
            if best.as_ref().is_none_or(|(_, b)| v > *b) {
                best = Some((x, v));
            }
        }

        match best {
            Some((x, v)) if v.is_finite() => Ok((x, v)),
            Some((_, v)) => Err(MaximizerError::NonFinite(v)),
            None => Err(MaximizerError::NoCandidates),
        }
    }
}

/// Builder for [`CandidateSearchMaximizer`].
///
/// Defaults:
/// - `sampling`: [`CandidateSampling::Random`]
/// - `refine_steps`: 64
/// - `initial_step`: 0.1 of each box side
/// - `shrink`: 0.7
/// - `seed`: random
#[derive(Clone, Debug, Default)]
pub struct CandidateSearchMaximizerBuilder {
    seed: Option<u64>,
    sampling: Option<CandidateSampling>,
    refine_steps: Option<usize>,
    initial_step: Option<f64>,
    shrink: Option<f64>,
}

impl CandidateSearchMaximizerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the random seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets how raw candidates are generated.
    #[must_use]
    pub fn sampling(mut self, sampling: CandidateSampling) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Sets the number of local proposals per start. Zero disables refinement.
    #[must_use]
    pub fn refine_steps(mut self, n: usize) -> Self {
        self.refine_steps = Some(n);
        self
    }

    /// Sets the initial perturbation as a fraction of each box side.
    #[must_use]
    pub fn initial_step(mut self, step: f64) -> Self {
        self.initial_step = Some(step);
        self
    }

    /// Sets the factor applied to the step after a rejected proposal.
    #[must_use]
    pub fn shrink(mut self, factor: f64) -> Self {
        self.shrink = Some(factor);
        self
    }

    /// Builds the configured [`CandidateSearchMaximizer`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn build(self) -> CandidateSearchMaximizer {
        let mut rng = self
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let sobol_seed = self.seed.map_or_else(|| rng.u32(..), |s| s as u32);
        CandidateSearchMaximizer {
            state: Mutex::new(SearchState {
                rng,
                sobol_index: 0,
                sobol_seed,
            }),
            sampling: self.sampling.unwrap_or_default(),
            refine_steps: self.refine_steps.unwrap_or(DEFAULT_REFINE_STEPS),
            initial_step: self.initial_step.unwrap_or(DEFAULT_INITIAL_STEP),
            shrink: self.shrink.unwrap_or(DEFAULT_SHRINK),
        }
    }
}
