//! Adaptive λ scheduling for the Gittins-index acquisition policy.
//!
//! The index policy trades expected improvement against evaluation cost
//! through a scalar λ: large values explore, small values exploit. Instead
//! of a hand-tuned schedule, λ starts large and shrinks whenever the policy
//! stops finding candidates that look better than the incumbent.
//!
//! # Strategies
//!
//! | Strategy | Initial λ | On update |
//! |----------|-----------|-----------|
//! | [`SubsidiaryOptimum`](LambdaStrategy::SubsidiaryOptimum) | computed on the first step | `min(λ, max acq / divisor)` of a plain or cost-weighted improvement acquisition |
//! | [`Halving`](LambdaStrategy::Halving) | `0.1` | `λ / 2` |
//! | [`Fixed`](LambdaStrategy::Fixed) | caller-supplied | never updated |
//!
//! Both adaptive strategies share the same trigger (see
//! [`LambdaScheduler::observe_step`]). Under either one λ never increases
//! within a run.
//!
//! The [`LambdaState`] is owned by the controller for one run and passed in
//! by reference each step; the scheduler itself holds only configuration.
//!
//! # Examples
//!
//! ```
//! use bayesopt::Direction;
//! use bayesopt::cost::CostModel;
//! use bayesopt::lambda::{LambdaScheduler, LambdaStrategy};
//!
//! let scheduler = LambdaScheduler::new(LambdaStrategy::halving()).unwrap();
//! let mut state = scheduler.initial_state();
//! let cost = CostModel::default();
//!
//! let mut lambda = || {
//!     scheduler
//!         .current_lambda(&mut state, &(), Direction::Maximize, 1.0, &cost, |_| {
//!             unreachable!("halving never runs a subsidiary optimization")
//!         })
//!         .unwrap()
//! };
//! assert_eq!(lambda(), 0.1);
//! ```

use crate::acquisition::AcquisitionParams;
use crate::cost::CostModel;
use crate::error::{Collaborator, Error, Result};
use crate::types::Direction;

/// Starting λ of the halving strategy.
pub const HALVING_INITIAL_LAMBDA: f64 = 0.1;

/// Default divisor applied to the subsidiary acquisition maximum.
pub const DEFAULT_LAMBDA_DIVISOR: f64 = 2.0;

/// How λ evolves over one run. Selected once per run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LambdaStrategy {
    /// Derive λ from the maximum of a simpler improvement acquisition.
    ///
    /// The subsidiary function is cost-weighted improvement when the cost
    /// model is input-dependent and plain improvement otherwise. Its
    /// maximum divided by `divisor` is the proposed λ.
    SubsidiaryOptimum {
        /// Divisor applied to the subsidiary maximum. Default: 2.
        divisor: f64,
    },
    /// Start at `initial` and halve on every triggered update.
    Halving {
        /// Starting λ. Default: 0.1.
        initial: f64,
    },
    /// A caller-supplied constant. No scheduling takes place: the
    /// acquisition selector hands it out directly and only records it.
    Fixed(f64),
}

impl LambdaStrategy {
    /// Subsidiary-optimum strategy with the default divisor of 2.
    #[must_use]
    pub fn subsidiary_optimum() -> Self {
        Self::SubsidiaryOptimum {
            divisor: DEFAULT_LAMBDA_DIVISOR,
        }
    }

    /// Halving strategy starting at 0.1.
    #[must_use]
    pub fn halving() -> Self {
        Self::Halving {
            initial: HALVING_INITIAL_LAMBDA,
        }
    }

    /// Returns `true` for strategies that react to the update trigger.
    #[must_use]
    pub fn is_adaptive(self) -> bool {
        !matches!(self, Self::Fixed(_))
    }

    fn validate(self) -> Result<Self> {
        let (what, value) = match self {
            Self::SubsidiaryOptimum { divisor } => ("lambda divisor", divisor),
            Self::Halving { initial } => ("initial lambda", initial),
            Self::Fixed(lambda) => ("lambda", lambda),
        };
        if value.is_finite() && value > 0.0 {
            Ok(self)
        } else {
            Err(Error::InvalidPolicyOptions(format!(
                "{what} must be positive and finite, got {value}"
            )))
        }
    }
}

/// Per-run λ bookkeeping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LambdaState {
    current: Option<f64>,
    need_update: bool,
    history: Vec<f64>,
}

impl LambdaState {
    /// The λ in effect, or `None` before the first subsidiary computation.
    #[must_use]
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    /// Whether λ must be refreshed before the next acquisition optimization.
    #[must_use]
    pub fn need_update(&self) -> bool {
        self.need_update
    }

    /// Every λ handed out during the run, in order.
    #[must_use]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub(crate) fn record(&mut self, lambda: f64) {
        self.history.push(lambda);
    }
}

/// Produces λ for each index-policy step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LambdaScheduler {
    strategy: LambdaStrategy,
}

impl LambdaScheduler {
    /// Creates a scheduler for `strategy`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicyOptions`] if the divisor or λ is not
    /// positive and finite.
    pub fn new(strategy: LambdaStrategy) -> Result<Self> {
        Ok(Self {
            strategy: strategy.validate()?,
        })
    }

    /// The configured strategy.
    #[must_use]
    pub fn strategy(&self) -> LambdaStrategy {
        self.strategy
    }

    /// Fresh state for the start of a run.
    #[must_use]
    pub fn initial_state(&self) -> LambdaState {
        match self.strategy {
            LambdaStrategy::SubsidiaryOptimum { .. } => LambdaState {
                current: None,
                need_update: true,
                history: Vec::new(),
            },
            LambdaStrategy::Halving { initial } => LambdaState {
                current: Some(initial),
                need_update: false,
                history: Vec::new(),
            },
            LambdaStrategy::Fixed(lambda) => LambdaState {
                current: Some(lambda),
                need_update: false,
                history: Vec::new(),
            },
        }
    }

    /// Return the λ for this step, recomputing it first if flagged.
    ///
    /// `maximize_subsidiary` is only called by the subsidiary-optimum
    /// strategy: it receives the parameters of the simpler improvement
    /// acquisition and must return the maximum acquisition value attained.
    /// The returned λ is appended to the state's history.
    ///
    /// # Errors
    ///
    /// Propagates any error from `maximize_subsidiary`, and returns
    /// [`Error::CollaboratorFailure`] if the subsidiary maximum is not finite.
    pub fn current_lambda<'a, M, F>(
        &self,
        state: &mut LambdaState,
        model: &'a M,
        direction: Direction,
        best_value: f64,
        cost: &'a CostModel,
        maximize_subsidiary: F,
    ) -> Result<f64>
    where
        F: FnOnce(AcquisitionParams<'a, M>) -> Result<f64>,
    {
        let lambda = match self.strategy {
            LambdaStrategy::SubsidiaryOptimum { divisor } => {
                if state.need_update || state.current.is_none() {
                    let params = subsidiary_params(model, direction, best_value, cost);
                    let maximum = maximize_subsidiary(params)?;
                    if !maximum.is_finite() {
                        return Err(Error::collaborator(
                            Collaborator::Maximizer,
                            format!("subsidiary acquisition maximum is {maximum}"),
                        ));
                    }
                    let proposed = maximum / divisor;
                    let lambda = state.current.map_or(proposed, |prev| prev.min(proposed));
                    trace_debug!(proposed, lambda, "lambda recomputed from subsidiary optimum");
                    state.current = Some(lambda);
                    state.need_update = false;
                }
                state.current.unwrap_or_default()
            }
            LambdaStrategy::Halving { initial } => {
                let mut lambda = state.current.unwrap_or(initial);
                if state.need_update {
                    lambda /= 2.0;
                    trace_debug!(lambda, "lambda halved");
                    state.need_update = false;
                }
                state.current = Some(lambda);
                lambda
            }
            LambdaStrategy::Fixed(lambda) => lambda,
        };
        state.history.push(lambda);
        Ok(lambda)
    }

    /// Flag an update for the next step if the index policy stopped
    /// finding candidates that beat the incumbent.
    ///
    /// No-op for [`LambdaStrategy::Fixed`].
    pub fn observe_step(
        &self,
        state: &mut LambdaState,
        direction: Direction,
        attained_acquisition: f64,
        best_value: f64,
    ) {
        if self.strategy.is_adaptive()
            && falls_short(direction, attained_acquisition, best_value)
        {
            state.need_update = true;
        }
    }
}

/// The update trigger.
///
/// Compares the acquisition value attained at the chosen point against the
/// best observed value, flipping the sign of the acquisition value when
/// minimizing. This mixes an index value with an objective value, so it is
/// a heuristic rather than a derived stopping criterion.
#[must_use]
pub fn falls_short(direction: Direction, attained_acquisition: f64, best_value: f64) -> bool {
    match direction {
        Direction::Maximize => attained_acquisition < best_value,
        Direction::Minimize => -attained_acquisition > best_value,
    }
}

fn subsidiary_params<'a, M>(
    model: &'a M,
    direction: Direction,
    best_f: f64,
    cost: &'a CostModel,
) -> AcquisitionParams<'a, M> {
    if cost.is_input_dependent() {
        AcquisitionParams::ExpectedImprovementWithCost {
            model,
            direction,
            best_f,
            cost,
            alpha: None,
        }
    } else {
        AcquisitionParams::ExpectedImprovement {
            model,
            direction,
            best_f,
        }
    }
}
