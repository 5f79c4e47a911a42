//! Cost-aware optimization under a fixed spending limit.
//!
//! Evaluations near the upper corner of the box are expensive. Cost-cooled
//! expected improvement per unit cost and the Gittins index both spend the
//! same budget; compare how many evaluations each buys and what they find.
//!
//! With the `serde` feature, the Gittins run report is written to
//! `cost_budget_report.json` in the system temp directory.
//!
//! Run with: `cargo run --example cost_budget --features serde`

#[path = "../benches/test_functions.rs"]
#[allow(dead_code)]
mod test_functions;
#[path = "../benches/toy_models.rs"]
mod toy_models;

use bayesopt::acquisition::{COST_COOLING, Policy, PolicyOptions, STEP_EIPU};
use bayesopt::collaborator::pointwise;
use bayesopt::cost::CostModel;
use bayesopt::design::random_points;
use bayesopt::maximizer::CandidateSearchMaximizer;
use bayesopt::{BayesianOptimizer, RunReport};

use toy_models::{OptimisticImprovement, fit_idw};

const DIM: usize = 3;
const BUDGET: f64 = 30.0;

/// Cheap at the origin, ten times dearer at the far corner.
fn evaluation_cost(x: &[f64]) -> f64 {
    0.2 + 2.0 * x.iter().sum::<f64>() / 3.0
}

fn spend(policy: Policy, options: PolicyOptions) -> bayesopt::Result<RunReport> {
    let mut optimizer = BayesianOptimizer::builder(DIM)
        .minimize()
        .cost(CostModel::function(evaluation_cost))
        .num_restarts(4)
        .raw_samples(512)
        .build(
            random_points(2 * DIM + 1, DIM, Some(7)),
            pointwise(test_functions::levy_unit),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(7),
        )?;
    optimizer.run_until_budget(BUDGET, policy, options)
}

fn summarize(label: &str, report: &RunReport) {
    println!(
        "{label:<24} evaluations: {:>3}  spent: {:>7.3}  best: {:.5}",
        report.steps, report.cumulative_cost, report.best_value
    );
}

fn main() -> bayesopt::Result<()> {
    let cooled = spend(
        Policy::ExpectedImprovementWithCost,
        PolicyOptions::new().with(COST_COOLING, true),
    )?;
    summarize("EIpu (cost cooling)", &cooled);

    let gittins = spend(
        Policy::GittinsIndex,
        PolicyOptions::new().with(STEP_EIPU, true),
    )?;
    summarize("Gittins (subsidiary)", &gittins);
    if let Some(last) = gittins.lambda_history.last() {
        println!("final λ: {last:.5}");
    }

    #[cfg(feature = "serde")]
    {
        let path = std::env::temp_dir().join("cost_budget_report.json");
        match gittins.save(&path) {
            Ok(()) => println!("report written to {}", path.display()),
            Err(e) => eprintln!("could not write report: {e}"),
        }
    }

    Ok(())
}
