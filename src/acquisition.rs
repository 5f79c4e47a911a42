//! Acquisition policy selection and parameter assembly.
//!
//! A run names an acquisition [`Policy`] plus free-form [`PolicyOptions`].
//! Each step the [`AcquisitionSelector`] turns them, together with the
//! freshly fitted model and the current bookkeeping, into a fully
//! parameterized [`AcquisitionParams`] value that an
//! [`Acquisition`](crate::collaborator::Acquisition) evaluator understands.
//!
//! | Policy | Parameters |
//! |--------|------------|
//! | [`ExpectedImprovement`](Policy::ExpectedImprovement) | model, direction, best value |
//! | [`ExpectedImprovementWithCost`](Policy::ExpectedImprovementWithCost) | model, direction, best value, cost model, optional cooling factor |
//! | [`GittinsIndex`](Policy::GittinsIndex) | model, direction, cost model, λ |
//! | [`Other`](Policy::Other) | model, direction, caller options verbatim |
//!
//! # Recognized options
//!
//! | Key | Type | Used by |
//! |-----|------|---------|
//! | `cost_cooling` | bool | cost-weighted improvement: anneal the cost weight to zero over the budget |
//! | `step_eipu` | bool | Gittins: λ from the subsidiary improvement optimum |
//! | `step_halving` | bool | Gittins: λ halving from 0.1 |
//! | `lmbda` | float | Gittins: fixed λ |
//! | `lmbda_divisor` | float | Gittins with `step_eipu`: divisor of the subsidiary optimum (default 2) |
//!
//! ```
//! use bayesopt::acquisition::{Policy, PolicyMode, PolicyOptions};
//!
//! let policy = Policy::parse("Gittins", PolicyMode::Strict).unwrap();
//! assert_eq!(policy, Policy::GittinsIndex);
//! assert!(Policy::parse("ThompsonSampling", PolicyMode::Strict).is_err());
//!
//! let options = PolicyOptions::new().with("step_halving", true);
//! assert!(options.flag("step_halving"));
//! ```

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cost::CostModel;
use crate::error::{Error, Result};
use crate::lambda::{LambdaScheduler, LambdaState, LambdaStrategy};
use crate::types::Direction;

/// Option key enabling cost cooling for cost-weighted improvement.
pub const COST_COOLING: &str = "cost_cooling";
/// Option key selecting the subsidiary-optimum λ strategy.
pub const STEP_EIPU: &str = "step_eipu";
/// Option key selecting the halving λ strategy.
pub const STEP_HALVING: &str = "step_halving";
/// Option key supplying a fixed λ.
pub const LAMBDA: &str = "lmbda";
/// Option key overriding the subsidiary-optimum divisor.
pub const LAMBDA_DIVISOR: &str = "lmbda_divisor";

/// Acquisition policy family.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Plain expected improvement.
    ExpectedImprovement,
    /// Expected improvement per unit cost.
    ExpectedImprovementWithCost,
    /// Cost-aware Gittins-style index parameterized by λ.
    GittinsIndex,
    /// Any other policy; options are passed through uninterpreted.
    Other(String),
}

/// How [`Policy::parse`] treats unrecognized names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolicyMode {
    /// Unknown names become [`Policy::Other`].
    #[default]
    Permissive,
    /// Unknown names are rejected with [`Error::UnknownPolicy`].
    Strict,
}

impl Policy {
    /// Parse a policy name.
    ///
    /// Accepts `ExpectedImprovement`/`EI`, `ExpectedImprovementWithCost`/`EIpu`
    /// and `GittinsIndex`/`Gittins`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPolicy`] for other names in strict mode.
    pub fn parse(name: &str, mode: PolicyMode) -> Result<Self> {
        let policy = match name {
            "ExpectedImprovement" | "EI" => Self::ExpectedImprovement,
            "ExpectedImprovementWithCost" | "EIpu" => Self::ExpectedImprovementWithCost,
            "GittinsIndex" | "Gittins" => Self::GittinsIndex,
            other => Self::Other(other.to_owned()),
        };
        policy.check(mode)
    }

    fn check(self, mode: PolicyMode) -> Result<Self> {
        match (&self, mode) {
            (Self::Other(name), PolicyMode::Strict) => Err(Error::UnknownPolicy(name.clone())),
            _ => Ok(self),
        }
    }

    /// Canonical name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::ExpectedImprovement => "ExpectedImprovement",
            Self::ExpectedImprovementWithCost => "ExpectedImprovementWithCost",
            Self::GittinsIndex => "GittinsIndex",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for the λ-parameterized index policy.
    #[must_use]
    pub fn is_index_based(&self) -> bool {
        matches!(self, Self::GittinsIndex)
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, PolicyMode::Permissive)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single option value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum OptionValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
}

impl OptionValue {
    /// The value as a bool, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a float. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Free-form keyword options for a policy.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PolicyOptions {
    values: BTreeMap<String, OptionValue>,
}

impl PolicyOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an option.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up an option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    /// `true` only if `key` is present and set to `true`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(OptionValue::as_bool) == Some(true)
    }

    /// A numeric option.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicyOptions`] if `key` is present but not numeric.
    pub fn float(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    Error::InvalidPolicyOptions(format!("option '{key}' must be numeric, got {v:?}"))
                })
            })
            .transpose()
    }

    /// Iterate over all options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no options are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve the λ strategy for the index policy.
    ///
    /// `step_eipu` takes precedence over `step_halving`, which takes
    /// precedence over a fixed `lmbda`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPolicyOptions`] if none of them is set or a
    /// numeric option is malformed.
    pub fn lambda_strategy(&self) -> Result<LambdaStrategy> {
        if self.flag(STEP_EIPU) {
            let divisor = self
                .float(LAMBDA_DIVISOR)?
                .unwrap_or(crate::lambda::DEFAULT_LAMBDA_DIVISOR);
            return Ok(LambdaStrategy::SubsidiaryOptimum { divisor });
        }
        if self.flag(STEP_HALVING) {
            return Ok(LambdaStrategy::halving());
        }
        match self.float(LAMBDA)? {
            Some(lambda) => Ok(LambdaStrategy::Fixed(lambda)),
            None => Err(Error::InvalidPolicyOptions(format!(
                "GittinsIndex requires one of '{STEP_EIPU}', '{STEP_HALVING}' or '{LAMBDA}'"
            ))),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PolicyOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

/// Fully assembled parameters for one acquisition function.
pub enum AcquisitionParams<'a, M> {
    /// Plain expected improvement over `best_f`.
    ExpectedImprovement {
        /// Fitted surrogate.
        model: &'a M,
        /// Optimization direction.
        direction: Direction,
        /// Incumbent value.
        best_f: f64,
    },
    /// Expected improvement per unit cost.
    ExpectedImprovementWithCost {
        /// Fitted surrogate.
        model: &'a M,
        /// Optimization direction.
        direction: Direction,
        /// Incumbent value.
        best_f: f64,
        /// Cost model weighting the improvement.
        cost: &'a CostModel,
        /// Cost-cooling factor in `[0, 1]`, present when cooling is enabled.
        alpha: Option<f64>,
    },
    /// Gittins-style index.
    GittinsIndex {
        /// Fitted surrogate.
        model: &'a M,
        /// Optimization direction.
        direction: Direction,
        /// Cost model.
        cost: &'a CostModel,
        /// Exploration parameter.
        lambda: f64,
    },
    /// A policy the selector does not interpret.
    Other {
        /// Policy name.
        name: &'a str,
        /// Fitted surrogate.
        model: &'a M,
        /// Optimization direction.
        direction: Direction,
        /// Caller options, verbatim.
        options: &'a PolicyOptions,
    },
}

impl<M> AcquisitionParams<'_, M> {
    /// The fitted surrogate.
    #[must_use]
    pub fn model(&self) -> &M {
        match self {
            Self::ExpectedImprovement { model, .. }
            | Self::ExpectedImprovementWithCost { model, .. }
            | Self::GittinsIndex { model, .. }
            | Self::Other { model, .. } => model,
        }
    }

    /// The optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::ExpectedImprovement { direction, .. }
            | Self::ExpectedImprovementWithCost { direction, .. }
            | Self::GittinsIndex { direction, .. }
            | Self::Other { direction, .. } => *direction,
        }
    }

    /// Name of the policy these parameters belong to.
    #[must_use]
    pub fn policy_name(&self) -> &str {
        match self {
            Self::ExpectedImprovement { .. } => "ExpectedImprovement",
            Self::ExpectedImprovementWithCost { .. } => "ExpectedImprovementWithCost",
            Self::GittinsIndex { .. } => "GittinsIndex",
            Self::Other { name, .. } => name,
        }
    }

    /// λ for index-policy parameters.
    #[must_use]
    pub fn lambda(&self) -> Option<f64> {
        match self {
            Self::GittinsIndex { lambda, .. } => Some(*lambda),
            _ => None,
        }
    }
}

impl<M> fmt::Debug for AcquisitionParams<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedImprovement {
                direction, best_f, ..
            } => f
                .debug_struct("ExpectedImprovement")
                .field("direction", direction)
                .field("best_f", best_f)
                .finish_non_exhaustive(),
            Self::ExpectedImprovementWithCost {
                direction,
                best_f,
                cost,
                alpha,
                ..
            } => f
                .debug_struct("ExpectedImprovementWithCost")
                .field("direction", direction)
                .field("best_f", best_f)
                .field("cost", cost)
                .field("alpha", alpha)
                .finish_non_exhaustive(),
            Self::GittinsIndex {
                direction,
                cost,
                lambda,
                ..
            } => f
                .debug_struct("GittinsIndex")
                .field("direction", direction)
                .field("cost", cost)
                .field("lambda", lambda)
                .finish_non_exhaustive(),
            Self::Other {
                name,
                direction,
                options,
                ..
            } => f
                .debug_struct("Other")
                .field("name", name)
                .field("direction", direction)
                .field("options", options)
                .finish_non_exhaustive(),
        }
    }
}

/// Per-step inputs to [`AcquisitionSelector::select`].
pub struct SelectionContext<'a, M> {
    /// Model fitted to all observations so far.
    pub model: &'a M,
    /// Optimization direction.
    pub direction: Direction,
    /// Best observed value.
    pub best_value: f64,
    /// Active cost model.
    pub cost: &'a CostModel,
    /// Budget total used for cost cooling.
    pub budget: f64,
    /// Cost spent so far.
    pub cumulative_cost: f64,
}

/// Linear cost-cooling factor: `max((budget - spent) / budget, 0)`.
#[must_use]
pub fn cooling_factor(budget: f64, cumulative_cost: f64) -> f64 {
    ((budget - cumulative_cost) / budget).max(0.0)
}

/// Maps a policy and its options to per-step acquisition parameters.
#[derive(Clone, Debug)]
pub struct AcquisitionSelector {
    policy: Policy,
    options: PolicyOptions,
    scheduler: Option<LambdaScheduler>,
}

impl AcquisitionSelector {
    /// Validate `policy` and `options` for one run.
    ///
    /// For [`Policy::GittinsIndex`] the λ strategy is resolved here, once.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownPolicy`] for [`Policy::Other`] in strict mode.
    /// - [`Error::InvalidPolicyOptions`] if the index policy has no usable
    ///   λ strategy.
    pub fn new(policy: Policy, options: PolicyOptions, mode: PolicyMode) -> Result<Self> {
        let policy = policy.check(mode)?;
        let scheduler = if policy.is_index_based() {
            Some(LambdaScheduler::new(options.lambda_strategy()?)?)
        } else {
            None
        };
        Ok(Self {
            policy,
            options,
            scheduler,
        })
    }

    /// The selected policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// The caller's options.
    #[must_use]
    pub fn options(&self) -> &PolicyOptions {
        &self.options
    }

    /// The λ scheduler, for the index policy.
    #[must_use]
    pub fn scheduler(&self) -> Option<&LambdaScheduler> {
        self.scheduler.as_ref()
    }

    /// Fresh λ state for a run.
    #[must_use]
    pub fn initial_lambda_state(&self) -> LambdaState {
        self.scheduler
            .as_ref()
            .map(LambdaScheduler::initial_state)
            .unwrap_or_default()
    }

    /// Assemble the acquisition parameters for this step.
    ///
    /// `maximize_subsidiary` is forwarded to the λ scheduler and only used
    /// by the index policy's subsidiary-optimum strategy.
    ///
    /// # Errors
    ///
    /// Propagates errors from the λ scheduler.
    pub fn select<'a, M, F>(
        &'a self,
        ctx: SelectionContext<'a, M>,
        lambda_state: &mut LambdaState,
        maximize_subsidiary: F,
    ) -> Result<AcquisitionParams<'a, M>>
    where
        F: FnOnce(AcquisitionParams<'a, M>) -> Result<f64>,
    {
        let params = match &self.policy {
            Policy::ExpectedImprovement => plain_improvement(&ctx),
            Policy::ExpectedImprovementWithCost => {
                cost_weighted_improvement(&ctx, self.options.flag(COST_COOLING))
            }
            Policy::GittinsIndex => {
                let lambda = match &self.scheduler {
                    // A fixed λ needs no scheduling, only a history entry.
                    Some(scheduler) => match scheduler.strategy() {
                        LambdaStrategy::Fixed(lambda) => {
                            lambda_state.record(lambda);
                            lambda
                        }
                        _ => scheduler.current_lambda(
                            lambda_state,
                            ctx.model,
                            ctx.direction,
                            ctx.best_value,
                            ctx.cost,
                            maximize_subsidiary,
                        )?,
                    },
                    None => {
                        return Err(Error::InvalidPolicyOptions(
                            "index policy selected without a lambda strategy".to_owned(),
                        ));
                    }
                };
                index_based(&ctx, lambda)
            }
            Policy::Other(name) => pass_through(name, &ctx, &self.options),
        };
        Ok(params)
    }

    /// Feed the attained acquisition value back to the λ scheduler.
    pub fn after_step(
        &self,
        lambda_state: &mut LambdaState,
        direction: Direction,
        attained_acquisition: f64,
        best_value: f64,
    ) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.observe_step(lambda_state, direction, attained_acquisition, best_value);
        }
    }
}

fn plain_improvement<'a, M>(ctx: &SelectionContext<'a, M>) -> AcquisitionParams<'a, M> {
    AcquisitionParams::ExpectedImprovement {
        model: ctx.model,
        direction: ctx.direction,
        best_f: ctx.best_value,
    }
}

fn cost_weighted_improvement<'a, M>(
    ctx: &SelectionContext<'a, M>,
    cost_cooling: bool,
) -> AcquisitionParams<'a, M> {
    AcquisitionParams::ExpectedImprovementWithCost {
        model: ctx.model,
        direction: ctx.direction,
        best_f: ctx.best_value,
        cost: ctx.cost,
        alpha: cost_cooling.then(|| cooling_factor(ctx.budget, ctx.cumulative_cost)),
    }
}

fn index_based<'a, M>(ctx: &SelectionContext<'a, M>, lambda: f64) -> AcquisitionParams<'a, M> {
    AcquisitionParams::GittinsIndex {
        model: ctx.model,
        direction: ctx.direction,
        cost: ctx.cost,
        lambda,
    }
}

fn pass_through<'a, M>(
    name: &'a str,
    ctx: &SelectionContext<'a, M>,
    options: &'a PolicyOptions,
) -> AcquisitionParams<'a, M> {
    AcquisitionParams::Other {
        name,
        model: ctx.model,
        direction: ctx.direction,
        options,
    }
}
