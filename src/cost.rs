//! Evaluation cost models and the cumulative cost ledger.
//!
//! A [`CostModel`] is either a fixed positive cost per query or a function
//! of the query point. The [`CostLedger`] charges one query per controller
//! step and keeps the cumulative total plus a snapshot history that starts
//! at `0.0` before the first step.
//!
//! ```
//! use bayesopt::cost::{CostLedger, CostModel};
//!
//! let l1 = CostModel::function(|x: &[f64]| x.iter().map(|v| v.abs()).sum());
//! let mut ledger = CostLedger::new(l1);
//! let spent = ledger.record(&[0.3, 0.4]).unwrap();
//! assert!((spent - 0.7).abs() < 1e-12);
//! assert_eq!(ledger.history().len(), 2);
//! ```

use core::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Cost of evaluating the objective at a point.
#[derive(Clone)]
pub enum CostModel {
    /// The same positive cost for every query.
    Constant(f64),
    /// Input-dependent, non-negative cost.
    Function(Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>),
}

impl CostModel {
    /// A constant per-query cost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCost`] unless `cost` is finite and positive.
    pub fn constant(cost: f64) -> Result<Self> {
        if cost.is_finite() && cost > 0.0 {
            Ok(Self::Constant(cost))
        } else {
            Err(Error::InvalidCost(cost))
        }
    }

    /// An input-dependent cost.
    pub fn function(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    /// Returns `true` when the cost depends on the query point.
    #[must_use]
    pub fn is_input_dependent(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Cost of a single query at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCost`] if the cost function yields a negative
    /// or non-finite value.
    pub fn cost_at(&self, point: &[f64]) -> Result<f64> {
        match self {
            Self::Constant(c) => Ok(*c),
            Self::Function(f) => {
                let c = f(point);
                if c.is_finite() && c >= 0.0 {
                    Ok(c)
                } else {
                    Err(Error::InvalidCost(c))
                }
            }
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl fmt::Debug for CostModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => f.debug_tuple("Constant").field(c).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Cumulative cost bookkeeping, one record per query.
#[derive(Clone, Debug)]
pub struct CostLedger {
    model: CostModel,
    records: usize,
    cumulative: f64,
    history: Vec<f64>,
}

impl CostLedger {
    /// Creates an empty ledger. The history starts with a single `0.0`.
    #[must_use]
    pub fn new(model: CostModel) -> Self {
        Self {
            model,
            records: 0,
            cumulative: 0.0,
            history: vec![0.0],
        }
    }

    /// Charge one query at `point` and return the incremental cost.
    ///
    /// With a constant model the total is kept as `records × cost`, so it
    /// is exactly `n * c` after `n` records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCost`] if the cost function yields a negative
    /// value; the ledger is left unchanged.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, point: &[f64]) -> Result<f64> {
        let increment = self.model.cost_at(point)?;
        self.records += 1;
        self.cumulative = match self.model {
            CostModel::Constant(c) => self.records as f64 * c,
            CostModel::Function(_) => self.cumulative + increment,
        };
        self.history.push(self.cumulative);
        Ok(increment)
    }

    /// Total cost spent so far.
    #[must_use]
    pub fn cumulative(&self) -> f64 {
        self.cumulative
    }

    /// Cumulative cost snapshots: `0.0` followed by one entry per record.
    #[must_use]
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Number of queries charged.
    #[must_use]
    pub fn records(&self) -> usize {
        self.records
    }

    /// The active cost model.
    #[must_use]
    pub fn model(&self) -> &CostModel {
        &self.model
    }
}
