use bayesopt::acquisition::{COST_COOLING, Policy, PolicyOptions, STEP_EIPU, STEP_HALVING};
use bayesopt::collaborator::pointwise;
use bayesopt::cost::CostModel;
use bayesopt::design::random_points;
use bayesopt::maximizer::CandidateSearchMaximizer;
use bayesopt::{BayesianOptimizer, RunState};

use crate::test_functions::{ackley_unit, drop_wave_unit};
use crate::toy_models::{OptimisticImprovement, fit_idw};

fn non_increasing(xs: &[f64]) -> bool {
    xs.windows(2).all(|w| w[1] <= w[0])
}

#[test]
fn test_expected_improvement_on_ackley() {
    let mut opt = BayesianOptimizer::builder(2)
        .num_restarts(2)
        .raw_samples(64)
        .build(
            random_points(3, 2, Some(7)),
            pointwise(ackley_unit),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(7),
        )
        .unwrap();
    let initial_best = opt.best_value();

    let report = opt
        .run(12, Policy::ExpectedImprovement, PolicyOptions::new())
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(opt.observations().len(), 15);
    assert!(report.best_value <= initial_best);
    let regret = opt.regret_history(0.0);
    assert_eq!(regret.len(), opt.observations().len());
    assert!(non_increasing(&regret));
    assert!(regret.iter().all(|&r| r >= -1e-9));
    assert!(
        opt.observations()
            .points()
            .iter()
            .all(|p| p.iter().all(|v| (0.0..=1.0).contains(v)))
    );
}

#[test]
fn test_gittins_subsidiary_schedule_on_ackley() {
    let mut opt = BayesianOptimizer::builder(2)
        .num_restarts(2)
        .raw_samples(64)
        .build(
            random_points(3, 2, Some(11)),
            pointwise(ackley_unit),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(11),
        )
        .unwrap();

    let report = opt
        .run(10, Policy::GittinsIndex, PolicyOptions::new().with(STEP_EIPU, true))
        .unwrap();

    assert_eq!(report.lambda_history.len(), 10);
    assert!(non_increasing(&report.lambda_history));
    assert!(report.lambda_history.iter().all(|l| l.is_finite() && *l >= 0.0));
    assert!(non_increasing(&opt.regret_history(0.0)));
}

#[test]
fn test_gittins_halving_under_cost_budget() {
    let mut opt = BayesianOptimizer::builder(2)
        .maximize()
        .cost(CostModel::function(|x: &[f64]| 0.5 + x[0]))
        .num_restarts(2)
        .raw_samples(64)
        .build(
            random_points(4, 2, Some(3)),
            pointwise(|x: &[f64]| -drop_wave_unit(x)),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(3),
        )
        .unwrap();

    let report = opt
        .run_until_budget(
            6.0,
            Policy::GittinsIndex,
            PolicyOptions::new().with(STEP_HALVING, true),
        )
        .unwrap();

    assert_eq!(report.state, RunState::Exhausted);
    assert!(report.cumulative_cost >= 6.0);
    assert!(report.cumulative_cost < 6.0 + 1.5);
    assert_eq!(report.lambda_history.len(), report.steps);
    assert_eq!(report.lambda_history[0], 0.1);
    assert!(non_increasing(&report.lambda_history));
    assert!(report.best_history.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn test_cost_cooled_improvement_under_cost_budget() {
    let mut opt = BayesianOptimizer::builder(2)
        .cost(CostModel::function(|x: &[f64]| 0.2 + x.iter().sum::<f64>()))
        .num_restarts(2)
        .raw_samples(64)
        .build(
            random_points(3, 2, Some(5)),
            pointwise(ackley_unit),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(5),
        )
        .unwrap();

    let report = opt
        .run_until_budget(
            4.0,
            Policy::ExpectedImprovementWithCost,
            PolicyOptions::new().with(COST_COOLING, true),
        )
        .unwrap();

    assert_eq!(report.state, RunState::Exhausted);
    assert!(report.steps >= 2);
    assert!(report.cost_history.windows(2).all(|w| w[1] >= w[0]));
    assert!(opt.last_acquisition_value().is_some());
}
