//! Compare acquisition policies on the standard synthetic problems.
//!
//! Every problem is minimized over the unit hypercube, starting from
//! `2 * dim + 1` random points. Expected improvement and the Gittins index
//! (with both λ schedules) each get the same evaluation budget, and the
//! final regret against the known optimum is printed.
//!
//! Run with: `cargo run --example synthetic_problem`

#[path = "../benches/test_functions.rs"]
#[allow(dead_code)]
mod test_functions;
#[path = "../benches/toy_models.rs"]
mod toy_models;

use bayesopt::acquisition::{Policy, PolicyOptions, STEP_EIPU, STEP_HALVING};
use bayesopt::collaborator::pointwise;
use bayesopt::design::random_points;
use bayesopt::maximizer::CandidateSearchMaximizer;
use bayesopt::{BayesianOptimizer, RunReport};

use toy_models::{OptimisticImprovement, fit_idw};

const SEED: u64 = 42;
const ITERATIONS: usize = 25;

struct Problem {
    name: &'static str,
    dim: usize,
    objective: fn(&[f64]) -> f64,
    optimum: f64,
}

const PROBLEMS: [Problem; 5] = [
    Problem {
        name: "Ackley",
        dim: 4,
        objective: test_functions::ackley_unit,
        optimum: 0.0,
    },
    Problem {
        name: "DropWave",
        dim: 2,
        objective: test_functions::drop_wave_unit,
        optimum: -1.0,
    },
    Problem {
        name: "Shekel5",
        dim: 4,
        objective: test_functions::shekel5_unit,
        optimum: -10.1532,
    },
    Problem {
        name: "Rosenbrock",
        dim: 3,
        objective: test_functions::rosenbrock_unit,
        optimum: 0.0,
    },
    Problem {
        name: "Levy",
        dim: 3,
        objective: test_functions::levy_unit,
        optimum: 0.0,
    },
];

fn solve(problem: &Problem, policy: Policy, options: PolicyOptions) -> bayesopt::Result<RunReport> {
    let mut optimizer = BayesianOptimizer::builder(problem.dim)
        .minimize()
        .num_restarts(4)
        .raw_samples(256 * problem.dim)
        .build(
            random_points(2 * problem.dim + 1, problem.dim, Some(SEED)),
            pointwise(problem.objective),
            fit_idw,
            OptimisticImprovement,
            CandidateSearchMaximizer::with_seed(SEED),
        )?;
    optimizer.run(ITERATIONS, policy, options)
}

fn main() -> bayesopt::Result<()> {
    let policies = [
        ("EI", Policy::ExpectedImprovement, PolicyOptions::new()),
        (
            "Gittins (subsidiary)",
            Policy::GittinsIndex,
            PolicyOptions::new().with(STEP_EIPU, true),
        ),
        (
            "Gittins (halving)",
            Policy::GittinsIndex,
            PolicyOptions::new().with(STEP_HALVING, true),
        ),
    ];

    println!("{:<12} {:<22} {:>12} {:>12}", "problem", "policy", "best", "regret");
    for problem in &PROBLEMS {
        for (label, policy, options) in &policies {
            let report = solve(problem, policy.clone(), options.clone())?;
            println!(
                "{:<12} {:<22} {:>12.5} {:>12.5}",
                problem.name,
                label,
                report.best_value,
                report.best_value - problem.optimum,
            );
            if let (Some(first), Some(last)) =
                (report.lambda_history.first(), report.lambda_history.last())
            {
                println!("{:<12} {:<22} λ {first:.4} → {last:.4}", "", "");
            }
        }
    }

    Ok(())
}
