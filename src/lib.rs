#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Cost-aware Bayesian optimization controller with adaptive λ scheduling
//! for Gittins-index acquisition policies.
//!
//! The crate drives the sequential loop of Bayesian optimization over the
//! unit hypercube and leaves every numeric piece to the caller: surrogate
//! fitting, acquisition formulas, the continuous maximizer and the objective
//! itself are plugged in through the traits in [`collaborator`]. What the
//! crate owns is the bookkeeping in between (observations, best-so-far,
//! cumulative evaluation cost) and the decision of which acquisition
//! function to optimize next with which parameters.
//!
//! # Getting Started
//!
//! ```
//! use bayesopt::prelude::*;
//!
//! struct Flat;
//! impl Surrogate for Flat {
//!     fn posterior_mean_and_uncertainty(&self, _x: &[f64]) -> (f64, f64) {
//!         (0.0, 1.0)
//!     }
//! }
//!
//! // Prefers points far from the origin, discounted by λ.
//! struct Distance;
//! impl Acquisition<Flat> for Distance {
//!     fn evaluate(&self, params: &AcquisitionParams<'_, Flat>, x: &[f64]) -> f64 {
//!         let d: f64 = x.iter().sum();
//!         d - params.lambda().unwrap_or(0.0)
//!     }
//! }
//!
//! let mut optimizer = BayesianOptimizer::builder(2)
//!     .maximize()
//!     .raw_samples(32)
//!     .num_restarts(2)
//!     .build(
//!         design::random_points(4, 2, Some(0)),
//!         pointwise(|x: &[f64]| x[0] + x[1]),
//!         |_: &[Vec<f64>], _: &[f64]| Ok::<_, String>(Flat),
//!         Distance,
//!         CandidateSearchMaximizer::with_seed(0),
//!     )
//!     .unwrap();
//!
//! let report = optimizer
//!     .run_until_budget(
//!         5.0,
//!         Policy::GittinsIndex,
//!         PolicyOptions::new().with("step_halving", true),
//!     )
//!     .unwrap();
//!
//! assert_eq!(report.state, RunState::Exhausted);
//! assert_eq!(report.cost_history, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
//! assert_eq!(report.lambda_history[0], 0.1);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`BayesianOptimizer`] | Drive the fit → select → maximize → evaluate loop under a [`Budget`]. |
//! | [`ObservationStore`](observation::ObservationStore) | Append-only observations with the running best value and its history. |
//! | [`CostLedger`](cost::CostLedger) | Cumulative evaluation cost under a constant or input-dependent [`CostModel`](cost::CostModel). |
//! | [`AcquisitionSelector`](acquisition::AcquisitionSelector) | Turn a [`Policy`](acquisition::Policy) and its options into per-step [`AcquisitionParams`](acquisition::AcquisitionParams). |
//! | [`LambdaScheduler`](lambda::LambdaScheduler) | Adapt λ for the Gittins-index policy: subsidiary optimum, halving, or fixed. |
//!
//! # Policies
//!
//! | Policy | Name(s) | Options |
//! |--------|---------|---------|
//! | Expected improvement | `ExpectedImprovement`, `EI` | none |
//! | Expected improvement per unit cost | `ExpectedImprovementWithCost`, `EIpu` | `cost_cooling` |
//! | Gittins index | `GittinsIndex`, `Gittins` | `step_eipu`, `step_halving`, `lmbda`, `lmbda_divisor` |
//! | anything else | any | passed through verbatim |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public data types, [`RunReport::save`]/[`RunReport::load`] | off |
//! | `sobol` | Scrambled Sobol candidates in [`CandidateSearchMaximizer`](maximizer::CandidateSearchMaximizer) and [`design::sobol_points`] | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) for runs, steps and λ updates | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod acquisition;
pub mod collaborator;
pub mod cost;
pub mod design;
mod error;
pub mod lambda;
pub mod maximizer;
pub mod observation;
mod optimizer;
mod types;

pub use error::{Collaborator, Error, Result};
pub use optimizer::{BayesianOptimizer, BayesianOptimizerBuilder, RunReport};
pub use types::{Bounds, Budget, Direction, RunState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use bayesopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acquisition::{
        AcquisitionParams, AcquisitionSelector, OptionValue, Policy, PolicyMode, PolicyOptions,
    };
    pub use crate::collaborator::{
        Acquisition, Maximizer, Objective, Surrogate, SurrogateFit, pointwise,
    };
    pub use crate::cost::{CostLedger, CostModel};
    pub use crate::design;
    pub use crate::error::{Collaborator, Error, Result};
    pub use crate::lambda::{LambdaScheduler, LambdaState, LambdaStrategy};
    pub use crate::maximizer::{CandidateSampling, CandidateSearchMaximizer};
    pub use crate::observation::ObservationStore;
    pub use crate::optimizer::{BayesianOptimizer, BayesianOptimizerBuilder, RunReport};
    pub use crate::types::{Bounds, Budget, Direction, RunState};
}
