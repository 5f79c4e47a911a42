use bayesopt::acquisition::{Policy, PolicyOptions};
use bayesopt::cost::CostModel;
use bayesopt::{BayesianOptimizer, Budget, Error, RunState};

use crate::mocks::{PointSequence, Scripted, controller};

#[test]
fn test_unit_cost_budget_five_runs_five_steps() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.2, 0.2]);
    let mut opt = controller(
        BayesianOptimizer::builder(2).maximize(),
        vec![vec![0.5, 0.5]],
        |x| x[0],
        &acq,
        &max,
    );
    assert_eq!(opt.state(), RunState::Idle);

    let report = opt
        .run_until_budget(5.0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(report.steps, 5);
    assert_eq!(report.state, RunState::Exhausted);
    assert_eq!(report.cost_history, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(opt.cumulative_cost(), 5.0);
    assert_eq!(opt.state(), RunState::Exhausted);
    assert_eq!(max.calls(), 5);
}

#[test]
fn test_budget_overshoot_is_at_most_one_step() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.2]);
    let mut opt = controller(
        BayesianOptimizer::builder(1).cost(CostModel::constant(2.0).unwrap()),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    let report = opt
        .run_until_budget(5.0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(report.steps, 3);
    assert_eq!(report.cost_history, vec![0.0, 2.0, 4.0, 6.0]);
    let before_last = report.cost_history[report.cost_history.len() - 2];
    assert!(before_last < 5.0);
    assert!(report.cumulative_cost >= 5.0);
}

#[test]
fn test_input_dependent_cost_stops_once_budget_is_reached() {
    let acq = Scripted::new();
    let max = PointSequence::new(vec![vec![0.1, 0.3], vec![0.9, 0.7], vec![0.4, 0.4]]);
    let mut opt = controller(
        BayesianOptimizer::builder(2)
            .cost(CostModel::function(|x: &[f64]| x.iter().sum())),
        vec![vec![0.5, 0.5]],
        |x| x[0] * x[1],
        &acq,
        &max,
    );

    let budget = 4.0;
    let report = opt
        .run_until_budget(
            budget,
            Policy::ExpectedImprovementWithCost,
            PolicyOptions::new(),
        )
        .unwrap();

    let history = &report.cost_history;
    assert_eq!(history.len(), report.steps + 1);
    assert!(history[history.len() - 2] < budget);
    assert!(*history.last().unwrap() >= budget);
    assert!(history.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_exhausted_controller_performs_no_further_steps() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    opt.run_until_budget(3.0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    let again = opt
        .run_until_budget(3.0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(again.steps, 0);
    assert_eq!(again.state, RunState::Exhausted);
    assert_eq!(max.calls(), 3);

    // A larger ceiling continues from the cost already spent.
    let more = opt
        .run_until_budget(5.0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(more.steps, 2);
    assert_eq!(opt.cost_history(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_iteration_budget_completes() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    let first = opt
        .run(4, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(first.state, RunState::Completed);
    assert_eq!(first.steps, 4);

    let second = opt
        .run(2, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(second.steps, 2);
    assert_eq!(second.cost_history.len(), 7);
    assert_eq!(opt.observations().len(), 7);
}

#[test]
fn test_zero_iterations_completes_immediately() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    let report = opt
        .run(0, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(report.steps, 0);
    assert_eq!(report.state, RunState::Completed);
    assert_eq!(max.calls(), 0);
}

#[test]
fn test_constant_cost_accumulates_exactly() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1).cost(CostModel::constant(0.1).unwrap()),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    opt.run(10, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(opt.cumulative_cost(), 10.0 * 0.1);
    for (n, &c) in opt.cost_history().iter().enumerate() {
        assert_eq!(c, n as f64 * 0.1);
    }
}

#[test]
fn test_invalid_cost_budget_is_rejected() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    for budget in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = opt
            .run_with_budget(
                Budget::Cost(budget),
                Policy::ExpectedImprovement,
                PolicyOptions::new(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBudget(_)));
    }
    assert_eq!(opt.state(), RunState::Idle);
    assert_eq!(max.calls(), 0);
}
