use bayesopt::acquisition::{Policy, PolicyOptions};
use bayesopt::cost::CostModel;
use bayesopt::{BayesianOptimizer, Direction};

use crate::mocks::{PointSequence, Scripted, controller};

fn wandering() -> PointSequence {
    PointSequence::new(vec![
        vec![0.2],
        vec![0.9],
        vec![0.4],
        vec![0.95],
        vec![0.1],
        vec![0.6],
    ])
}

#[test]
fn test_best_history_monotone_when_maximizing() {
    let acq = Scripted::new();
    let max = wandering();
    let mut opt = controller(
        BayesianOptimizer::builder(1).maximize(),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    let report = opt
        .run(6, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(
        report.best_history,
        vec![0.5, 0.5, 0.9, 0.9, 0.95, 0.95, 0.95]
    );
    assert!(report.best_history.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(report.best_point, vec![0.95]);
    assert_eq!(opt.best_value(), 0.95);
}

#[test]
fn test_best_history_monotone_when_minimizing() {
    let acq = Scripted::new();
    let max = wandering();
    let mut opt = controller(
        BayesianOptimizer::builder(1).direction(Direction::Minimize),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    let report = opt
        .run(6, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(report.best_history, vec![0.5, 0.2, 0.2, 0.2, 0.2, 0.1, 0.1]);
    assert!(report.best_history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(opt.best_point(), &[0.1]);
}

#[test]
fn test_histories_stay_aligned() {
    let acq = Scripted::new();
    let max = wandering();
    let mut opt = controller(
        BayesianOptimizer::builder(1).maximize(),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    for steps in [3, 2] {
        let report = opt
            .run(steps, Policy::ExpectedImprovement, PolicyOptions::new())
            .unwrap();
        assert_eq!(report.best_history.len(), report.cost_history.len());
    }
    assert_eq!(opt.best_history().len(), 6);
    assert_eq!(opt.cost_history().len(), 6);
    // With a single initial point, best and cost histories line up.
    assert_eq!(opt.observations().len(), opt.best_history().len());
}

#[test]
fn test_initial_batch_contributes_one_best_entry_per_point() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1).maximize(),
        vec![vec![0.1], vec![0.7], vec![0.4]],
        |x| x[0],
        &acq,
        &max,
    );
    assert_eq!(opt.best_history(), &[0.1, 0.7, 0.7]);
    assert_eq!(opt.best_point(), &[0.7]);
    assert_eq!(opt.cost_history(), &[0.0]);

    opt.run(2, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(opt.best_history(), &[0.1, 0.7, 0.7, 0.7, 0.7]);
    assert_eq!(opt.observations().len(), 5);
    assert_eq!(opt.cost_history().len(), 3);
}

#[test]
fn test_input_dependent_cost_history() {
    let acq = Scripted::new();
    let max = PointSequence::fixed(vec![0.3, 0.4]);
    let mut opt = controller(
        BayesianOptimizer::builder(2)
            .cost(CostModel::function(|x: &[f64]| x.iter().map(|v| v.abs()).sum())),
        vec![vec![0.5, 0.5]],
        |x| x[0] + x[1],
        &acq,
        &max,
    );

    opt.run(3, Policy::ExpectedImprovementWithCost, PolicyOptions::new())
        .unwrap();

    let expected = [0.0, 0.7, 1.4, 2.1];
    assert_eq!(opt.cost_history().len(), expected.len());
    for (got, want) in opt.cost_history().iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{got} != {want}");
    }
    assert!(opt.cost_model().is_input_dependent());
}

#[test]
fn test_regret_history() {
    let acq = Scripted::new();
    let max = wandering();
    let mut opt = controller(
        BayesianOptimizer::builder(1).maximize(),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );

    opt.run(4, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    let regret = opt.regret_history(0.95);
    assert_eq!(regret.len(), opt.best_history().len());
    assert!(regret.windows(2).all(|w| w[1] <= w[0]));
    assert!(regret.iter().all(|&r| r >= 0.0));
    assert_eq!(*regret.last().unwrap(), 0.0);
}

#[test]
fn test_last_acquisition_value() {
    let acq = Scripted::new().improvement(&[0.25]);
    let max = PointSequence::fixed(vec![0.3]);
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| x[0],
        &acq,
        &max,
    );
    assert_eq!(opt.last_acquisition_value(), None);

    opt.run(1, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();
    assert_eq!(opt.last_acquisition_value(), Some(0.25));
}

#[test]
fn test_observations_record_every_query() {
    let acq = Scripted::new();
    let max = wandering();
    let mut opt = controller(
        BayesianOptimizer::builder(1),
        vec![vec![0.5]],
        |x| 2.0 * x[0],
        &acq,
        &max,
    );

    opt.run(3, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    let store = opt.observations();
    assert_eq!(store.points(), &[vec![0.5], vec![0.2], vec![0.9], vec![0.4]]);
    assert_eq!(store.values(), &[1.0, 0.4, 1.8, 0.8]);
    assert_eq!(store.dim(), 1);
    assert_eq!(opt.dim(), 1);
    assert_eq!(opt.num_restarts(), 20);
    assert_eq!(opt.raw_samples(), 1024);
}
