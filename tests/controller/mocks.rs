use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use bayesopt::acquisition::AcquisitionParams;
use bayesopt::collaborator::{Acquisition, Maximizer, Pointwise, Surrogate, pointwise};
use bayesopt::{BayesianOptimizer, BayesianOptimizerBuilder, Bounds};

pub struct Flat;

impl Surrogate for Flat {
    fn posterior_mean_and_uncertainty(&self, _x: &[f64]) -> (f64, f64) {
        (0.0, 1.0)
    }
}

pub type FitFn = fn(&[Vec<f64>], &[f64]) -> Result<Flat, String>;

pub fn flat_fit(_points: &[Vec<f64>], _values: &[f64]) -> Result<Flat, String> {
    Ok(Flat)
}

/// One acquisition evaluation as seen by [`Scripted`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Improvement { best_f: f64 },
    CostWeighted { best_f: f64, alpha: Option<f64> },
    Index { lambda: f64 },
    Other { name: String, options: usize },
}

/// Acquisition whose values are scripted per policy family and which logs
/// every evaluation.
///
/// Improvement-type evaluations consume `improvement` front to back and
/// repeat the last value once only one is left. Index evaluations always
/// return `index`.
pub struct Scripted {
    improvement: RefCell<VecDeque<f64>>,
    index: f64,
    calls: RefCell<Vec<Call>>,
}

impl Scripted {
    pub fn new() -> Self {
        Self {
            improvement: RefCell::new(VecDeque::from([1.0])),
            index: 0.0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn improvement(mut self, values: &[f64]) -> Self {
        self.improvement = RefCell::new(values.iter().copied().collect());
        self
    }

    pub fn index(mut self, value: f64) -> Self {
        self.index = value;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn next_improvement(&self) -> f64 {
        let mut queue = self.improvement.borrow_mut();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().copied().unwrap_or(0.0)
        }
    }
}

impl<M> Acquisition<M> for &Scripted {
    fn evaluate(&self, params: &AcquisitionParams<'_, M>, _x: &[f64]) -> f64 {
        let (call, value) = match params {
            AcquisitionParams::ExpectedImprovement { best_f, .. } => (
                Call::Improvement { best_f: *best_f },
                self.next_improvement(),
            ),
            AcquisitionParams::ExpectedImprovementWithCost { best_f, alpha, .. } => (
                Call::CostWeighted {
                    best_f: *best_f,
                    alpha: *alpha,
                },
                self.next_improvement(),
            ),
            AcquisitionParams::GittinsIndex { lambda, .. } => {
                (Call::Index { lambda: *lambda }, self.index)
            }
            AcquisitionParams::Other { name, options, .. } => (
                Call::Other {
                    name: (*name).to_owned(),
                    options: options.len(),
                },
                0.0,
            ),
        };
        self.calls.borrow_mut().push(call);
        value
    }
}

/// Maximizer that proposes the given points in turn, wrapping around, and
/// evaluates the acquisition exactly once per call.
pub struct PointSequence {
    points: Vec<Vec<f64>>,
    next: Cell<usize>,
    calls: Cell<usize>,
}

impl PointSequence {
    pub fn new(points: Vec<Vec<f64>>) -> Self {
        Self {
            points,
            next: Cell::new(0),
            calls: Cell::new(0),
        }
    }

    pub fn fixed(point: Vec<f64>) -> Self {
        Self::new(vec![point])
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Maximizer for &PointSequence {
    type Error = String;

    fn maximize(
        &self,
        f: &dyn Fn(&[f64]) -> f64,
        bounds: &Bounds,
        _num_restarts: usize,
        _raw_samples: usize,
    ) -> Result<(Vec<f64>, f64), String> {
        self.calls.set(self.calls.get() + 1);
        let i = self.next.get();
        self.next.set((i + 1) % self.points.len());
        let x = self.points[i].clone();
        if x.len() == bounds.dim() && !bounds.contains(&x) {
            return Err(format!("{x:?} is outside the search box"));
        }
        let value = f(&x);
        Ok((x, value))
    }
}

pub type Controller<'a, F> = BayesianOptimizer<Pointwise<F>, FitFn, &'a Scripted, &'a PointSequence>;

pub fn controller<'a, F>(
    builder: BayesianOptimizerBuilder<Pointwise<F>, FitFn, &'a Scripted, &'a PointSequence>,
    initial_points: Vec<Vec<f64>>,
    objective: F,
    acquisition: &'a Scripted,
    maximizer: &'a PointSequence,
) -> Controller<'a, F>
where
    F: FnMut(&[f64]) -> f64,
{
    builder
        .build(
            initial_points,
            pointwise(objective),
            flat_fit as FitFn,
            acquisition,
            maximizer,
        )
        .unwrap()
}
