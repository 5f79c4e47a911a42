//! The optimization controller.
//!
//! [`BayesianOptimizer`] owns the observations, the cost ledger and the
//! numeric collaborators, and drives the loop
//!
//! ```text
//! fit surrogate → select acquisition (λ scheduler as needed) → maximize over [0, 1]^dim
//!     → evaluate objective → record cost → append observation → λ update trigger
//! ```
//!
//! until the run's [`Budget`] says stop. Observations, the best value and
//! the cumulative cost carry over between runs on the same controller; the
//! λ state is fresh for every run.

use core::marker::PhantomData;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::acquisition::{
    AcquisitionParams, AcquisitionSelector, Policy, PolicyMode, PolicyOptions, SelectionContext,
};
use crate::collaborator::{Acquisition, Maximizer, Objective, SurrogateFit};
use crate::cost::{CostLedger, CostModel};
use crate::error::{Collaborator, Error, Result};
use crate::lambda::LambdaState;
use crate::observation::{ObservationStore, check_value};
use crate::types::{Bounds, Budget, Direction, RunState};

/// Restarts per dimension used when none are configured.
const DEFAULT_RESTARTS_PER_DIM: usize = 20;
/// Raw samples per dimension used when none are configured.
const DEFAULT_RAW_SAMPLES_PER_DIM: usize = 1024;

/// Outcome of one completed run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunReport {
    /// Terminal state of the run.
    pub state: RunState,
    /// Steps performed by this run.
    pub steps: usize,
    /// Best value over all observations so far.
    pub best_value: f64,
    /// Point at which the best value was observed.
    pub best_point: Vec<f64>,
    /// Total cost spent on this controller so far.
    pub cumulative_cost: f64,
    /// Best-so-far after every observation, initial batch included.
    pub best_history: Vec<f64>,
    /// Cumulative cost snapshots, starting at `0.0`.
    pub cost_history: Vec<f64>,
    /// λ used at every index-policy step of this run.
    pub lambda_history: Vec<f64>,
}

#[cfg(feature = "serde")]
impl RunReport {
    /// Write the report to `path` as pretty-printed JSON.
    ///
    /// The file is written to a temporary sibling first and then renamed
    /// into place.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let parent = path.parent().unwrap_or(std::path::Path::new("."));
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        let file = std::fs::File::create(&tmp_path)?;
        serde_json::to_writer_pretty(file, self).map_err(std::io::Error::other)?;
        std::fs::rename(&tmp_path, path)
    }

    /// Read a report written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Sequential cost-aware Bayesian optimization over the unit hypercube.
///
/// Generic over its four collaborators:
///
/// | Parameter | Bound | Role |
/// |-----------|-------|------|
/// | `O` | [`Objective`] | the expensive black-box function |
/// | `S` | [`SurrogateFit`] | fits a model to all observations each step |
/// | `A` | [`Acquisition<S::Model>`](Acquisition) | evaluates the assembled acquisition function |
/// | `X` | [`Maximizer`] | finds the acquisition maximum over the box |
///
/// # Examples
///
/// ```
/// use bayesopt::acquisition::{AcquisitionParams, Policy, PolicyOptions};
/// use bayesopt::collaborator::{Acquisition, Surrogate, pointwise};
/// use bayesopt::maximizer::CandidateSearchMaximizer;
/// use bayesopt::{BayesianOptimizer, RunState};
///
/// // A stand-in surrogate that already knows the objective.
/// struct Oracle;
/// impl Surrogate for Oracle {
///     fn posterior_mean_and_uncertainty(&self, x: &[f64]) -> (f64, f64) {
///         (-(x[0] - 0.6).powi(2), 0.0)
///     }
/// }
/// struct Mean;
/// impl Acquisition<Oracle> for Mean {
///     fn evaluate(&self, params: &AcquisitionParams<'_, Oracle>, x: &[f64]) -> f64 {
///         params.model().posterior_mean_and_uncertainty(x).0
///     }
/// }
///
/// let mut optimizer = BayesianOptimizer::builder(1)
///     .maximize()
///     .raw_samples(64)
///     .num_restarts(2)
///     .build(
///         vec![vec![0.1], vec![0.9]],
///         pointwise(|x: &[f64]| -(x[0] - 0.6).powi(2)),
///         |_: &[Vec<f64>], _: &[f64]| Ok::<_, String>(Oracle),
///         Mean,
///         CandidateSearchMaximizer::with_seed(1),
///     )
///     .unwrap();
///
/// let report = optimizer
///     .run(3, Policy::ExpectedImprovement, PolicyOptions::new())
///     .unwrap();
/// assert_eq!(report.state, RunState::Completed);
/// assert_eq!(report.cost_history, vec![0.0, 1.0, 2.0, 3.0]);
/// assert!(report.best_value > -0.01);
/// ```
pub struct BayesianOptimizer<O, S, A, X> {
    dim: usize,
    direction: Direction,
    bounds: Bounds,
    num_restarts: usize,
    raw_samples: usize,
    policy_mode: PolicyMode,
    objective: O,
    fitter: S,
    acquisition: A,
    maximizer: X,
    store: ObservationStore,
    ledger: CostLedger,
    state: RunState,
    lambda: LambdaState,
    last_acquisition_value: Option<f64>,
}

impl<O, S, A, X> BayesianOptimizer<O, S, A, X>
where
    O: Objective,
    S: SurrogateFit,
    A: Acquisition<S::Model>,
    X: Maximizer,
{
    /// Creates a builder for a `dim`-dimensional problem.
    #[must_use]
    pub fn builder(dim: usize) -> BayesianOptimizerBuilder<O, S, A, X> {
        BayesianOptimizerBuilder::new(dim)
    }

    /// Run exactly `num_iterations` steps.
    ///
    /// With cost cooling enabled, the cooling budget is `num_iterations`.
    ///
    /// # Errors
    ///
    /// See [`run_with_budget`](Self::run_with_budget).
    pub fn run(
        &mut self,
        num_iterations: usize,
        policy: Policy,
        options: PolicyOptions,
    ) -> Result<RunReport> {
        self.run_with_budget(Budget::Iterations(num_iterations), policy, options)
    }

    /// Run until the cumulative cost reaches `budget`.
    ///
    /// The budget is checked before every step, so the run may overshoot it
    /// by at most one step's cost. Cost spent by earlier runs counts.
    ///
    /// # Errors
    ///
    /// A step charged zero cost could never bring the run closer to the
    /// budget, so it aborts the run with [`Error::InvalidCost`] after the
    /// observation is recorded. Otherwise see
    /// [`run_with_budget`](Self::run_with_budget).
    pub fn run_until_budget(
        &mut self,
        budget: f64,
        policy: Policy,
        options: PolicyOptions,
    ) -> Result<RunReport> {
        self.run_with_budget(Budget::Cost(budget), policy, options)
    }

    /// Run under an arbitrary [`Budget`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBudget`] for a non-positive or non-finite cost budget.
    /// - [`Error::UnknownPolicy`] / [`Error::InvalidPolicyOptions`] from policy
    ///   validation; the controller state is left untouched.
    /// - Any step failure ([`Error::CollaboratorFailure`],
    ///   [`Error::InvalidCost`], [`Error::DimensionMismatch`],
    ///   [`Error::BatchLengthMismatch`]). The run is aborted and the
    ///   controller stays in [`RunState::Running`].
    /// - [`Error::InvalidCost`] under a [`Budget::Cost`] when a step is
    ///   charged zero cost. That step's observation and cost are kept.
    pub fn run_with_budget(
        &mut self,
        budget: Budget,
        policy: Policy,
        options: PolicyOptions,
    ) -> Result<RunReport> {
        let budget = budget.validate()?;
        let selector = AcquisitionSelector::new(policy, options, self.policy_mode)?;

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "run",
            budget = ?budget,
            policy = %selector.policy(),
            direction = ?self.direction
        )
        .entered();

        self.lambda = selector.initial_lambda_state();
        self.state = RunState::Running;
        let cooling_total = budget.cooling_total();

        let mut steps = 0;
        while !budget.should_stop(steps, self.ledger.cumulative()) {
            let cost = self.step(&selector, cooling_total)?;
            steps += 1;
            if budget.requires_progress() && cost <= 0.0 {
                return Err(Error::InvalidCost(cost));
            }
        }

        self.state = budget.terminal_state();
        trace_info!(
            steps,
            best_value = self.store.best_value(),
            cumulative_cost = self.ledger.cumulative(),
            "run finished"
        );
        Ok(self.report(steps))
    }

    /// Perform one step and return the cost it was charged.
    fn step(&mut self, selector: &AcquisitionSelector, cooling_total: f64) -> Result<f64> {
        let model = self
            .fitter
            .fit(self.store.points(), self.store.values())
            .map_err(|e| Error::collaborator(Collaborator::SurrogateFit, e))?;

        let ctx = SelectionContext {
            model: &model,
            direction: self.direction,
            best_value: self.store.best_value(),
            cost: self.ledger.model(),
            budget: cooling_total,
            cumulative_cost: self.ledger.cumulative(),
        };
        let search = Search {
            acquisition: &self.acquisition,
            maximizer: &self.maximizer,
            bounds: &self.bounds,
            num_restarts: self.num_restarts,
            raw_samples: self.raw_samples,
        };
        let params = selector.select(ctx, &mut self.lambda, |subsidiary| {
            search.maximize(&subsidiary).map(|(_, value)| value)
        })?;
        let (candidate, attained) = search.maximize(&params)?;
        if candidate.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                got: candidate.len(),
            });
        }

        let values = self
            .objective
            .evaluate(core::slice::from_ref(&candidate))
            .map_err(|e| Error::collaborator(Collaborator::Objective, e))?;
        let value = match values.as_slice() {
            [v] => *v,
            other => {
                return Err(Error::BatchLengthMismatch {
                    points: 1,
                    values: other.len(),
                });
            }
        };

        let value = check_value(value)?;
        let cost = self.ledger.record(&candidate)?;
        #[cfg(feature = "tracing")]
        let point = format!("{candidate:?}");
        self.store.append(candidate, value)?;
        self.last_acquisition_value = Some(attained);
        selector.after_step(
            &mut self.lambda,
            self.direction,
            attained,
            self.store.best_value(),
        );

        trace_info!(
            point = %point,
            value,
            best_value = self.store.best_value(),
            acquisition_value = attained,
            cost,
            cumulative_cost = self.ledger.cumulative(),
            lambda = ?self.lambda.current(),
            "step completed"
        );
        Ok(cost)
    }

    fn report(&self, steps: usize) -> RunReport {
        RunReport {
            state: self.state,
            steps,
            best_value: self.store.best_value(),
            best_point: self.store.best_point().to_vec(),
            cumulative_cost: self.ledger.cumulative(),
            best_history: self.store.best_history().to_vec(),
            cost_history: self.ledger.history().to_vec(),
            lambda_history: self.lambda.history().to_vec(),
        }
    }
}

impl<O, S, A, X> BayesianOptimizer<O, S, A, X> {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Best observed value.
    #[must_use]
    pub fn best_value(&self) -> f64 {
        self.store.best_value()
    }

    /// Point at which the best value was observed.
    #[must_use]
    pub fn best_point(&self) -> &[f64] {
        self.store.best_point()
    }

    /// Best-so-far after every observation, initial batch included.
    #[must_use]
    pub fn best_history(&self) -> &[f64] {
        self.store.best_history()
    }

    /// Total cost spent.
    #[must_use]
    pub fn cumulative_cost(&self) -> f64 {
        self.ledger.cumulative()
    }

    /// Cumulative cost snapshots, starting at `0.0`.
    #[must_use]
    pub fn cost_history(&self) -> &[f64] {
        self.ledger.history()
    }

    /// λ values of the current (or most recent) run.
    #[must_use]
    pub fn lambda_history(&self) -> &[f64] {
        self.lambda.history()
    }

    /// Acquisition value attained at the most recent query point.
    #[must_use]
    pub fn last_acquisition_value(&self) -> Option<f64> {
        self.last_acquisition_value
    }

    /// All observations.
    #[must_use]
    pub fn observations(&self) -> &ObservationStore {
        &self.store
    }

    /// Gap between the best history and a known optimum.
    #[must_use]
    pub fn regret_history(&self, global_optimum: f64) -> Vec<f64> {
        self.store.regret_history(global_optimum)
    }

    /// Search-space dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The active cost model.
    #[must_use]
    pub fn cost_model(&self) -> &CostModel {
        self.ledger.model()
    }

    /// Restarts handed to the maximizer.
    #[must_use]
    pub fn num_restarts(&self) -> usize {
        self.num_restarts
    }

    /// Raw samples handed to the maximizer.
    #[must_use]
    pub fn raw_samples(&self) -> usize {
        self.raw_samples
    }
}

/// Borrowed pieces needed to maximize one acquisition function.
struct Search<'a, A, X> {
    acquisition: &'a A,
    maximizer: &'a X,
    bounds: &'a Bounds,
    num_restarts: usize,
    raw_samples: usize,
}

impl<A, X: Maximizer> Search<'_, A, X> {
    fn maximize<M>(&self, params: &AcquisitionParams<'_, M>) -> Result<(Vec<f64>, f64)>
    where
        A: Acquisition<M>,
    {
        let f = |x: &[f64]| self.acquisition.evaluate(params, x);
        self.maximizer
            .maximize(&f, self.bounds, self.num_restarts, self.raw_samples)
            .map_err(|e| Error::collaborator(Collaborator::Maximizer, e))
    }
}

/// Builder for [`BayesianOptimizer`].
///
/// Created via [`BayesianOptimizer::builder`].
///
/// # Defaults
///
/// - Direction: [`Minimize`](Direction::Minimize)
/// - Cost: [`CostModel::Constant(1.0)`](CostModel::Constant)
/// - Restarts: `20 × dim`
/// - Raw samples: `1024 × dim`
/// - Policy mode: [`PolicyMode::Permissive`]
pub struct BayesianOptimizerBuilder<O, S, A, X> {
    dim: usize,
    direction: Direction,
    cost: Option<CostModel>,
    num_restarts: Option<usize>,
    raw_samples: Option<usize>,
    policy_mode: PolicyMode,
    _marker: PhantomData<fn() -> (O, S, A, X)>,
}

impl<O, S, A, X> BayesianOptimizerBuilder<O, S, A, X>
where
    O: Objective,
    S: SurrogateFit,
    A: Acquisition<S::Model>,
    X: Maximizer,
{
    /// Creates a builder for a `dim`-dimensional problem.
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            direction: Direction::Minimize,
            cost: None,
            num_restarts: None,
            raw_samples: None,
            policy_mode: PolicyMode::default(),
            _marker: PhantomData,
        }
    }

    /// Minimize the objective (the default).
    #[must_use]
    pub fn minimize(mut self) -> Self {
        self.direction = Direction::Minimize;
        self
    }

    /// Maximize the objective.
    #[must_use]
    pub fn maximize(mut self) -> Self {
        self.direction = Direction::Maximize;
        self
    }

    /// Set the direction explicitly.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the evaluation cost model.
    #[must_use]
    pub fn cost(mut self, cost: CostModel) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set the number of maximizer restarts.
    #[must_use]
    pub fn num_restarts(mut self, n: usize) -> Self {
        self.num_restarts = Some(n);
        self
    }

    /// Set the number of raw samples for the maximizer.
    #[must_use]
    pub fn raw_samples(mut self, n: usize) -> Self {
        self.raw_samples = Some(n);
        self
    }

    /// Set how unrecognized policies are handled.
    #[must_use]
    pub fn policy_mode(mut self, mode: PolicyMode) -> Self {
        self.policy_mode = mode;
        self
    }

    /// Evaluate the initial batch and build the controller in
    /// [`RunState::Idle`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if `dim` is zero.
    /// - [`Error::EmptyInitialBatch`], [`Error::DimensionMismatch`] or
    ///   [`Error::BatchLengthMismatch`] for a malformed batch.
    /// - [`Error::CollaboratorFailure`] if the objective fails.
    pub fn build(
        self,
        initial_points: Vec<Vec<f64>>,
        mut objective: O,
        fitter: S,
        acquisition: A,
        maximizer: X,
    ) -> Result<BayesianOptimizer<O, S, A, X>> {
        if self.dim == 0 {
            return Err(Error::InvalidDimension);
        }
        if initial_points.is_empty() {
            return Err(Error::EmptyInitialBatch);
        }
        let store =
            ObservationStore::initialize(self.dim, self.direction, initial_points, &mut objective)?;
        trace_info!(
            dim = self.dim,
            initial_points = store.len(),
            best_value = store.best_value(),
            "initial batch evaluated"
        );

        Ok(BayesianOptimizer {
            dim: self.dim,
            direction: self.direction,
            bounds: Bounds::unit(self.dim),
            num_restarts: self
                .num_restarts
                .unwrap_or(DEFAULT_RESTARTS_PER_DIM * self.dim),
            raw_samples: self
                .raw_samples
                .unwrap_or(DEFAULT_RAW_SAMPLES_PER_DIM * self.dim),
            policy_mode: self.policy_mode,
            objective,
            fitter,
            acquisition,
            maximizer,
            store,
            ledger: CostLedger::new(self.cost.unwrap_or_default()),
            state: RunState::Idle,
            lambda: LambdaState::default(),
            last_acquisition_value: None,
        })
    }
}
