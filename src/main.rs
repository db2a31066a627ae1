use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use retention_optimizer::benchmark::run_benchmark;
use retention_optimizer::cli::{Action, CommandArgs};
use retention_optimizer::config::Config;
use retention_optimizer::item::Item;
use retention_optimizer::prep::{retention_items, retention_portfolio, write_justifications_json, write_portfolio_csv};
use retention_optimizer::solver::{solve, Deadline, SolveOutcome};
use retention_optimizer::{greedy, DriverError, Instance};

fn load_instance(path: &PathBuf, budget: f64) -> Result<Instance, DriverError> {
    let mut reader = csv::Reader::from_path(path).map_err(retention_optimizer::error::PrepError::from)?;
    let mut items = Vec::new();
    for record in reader.deserialize() {
        let row: InstanceRow = record.map_err(retention_optimizer::error::PrepError::from)?;
        items.push(Item::new(row.id, row.name, row.cost, row.impact, row.category));
    }
    Ok(Instance::new(items, budget)?)
}

#[derive(serde::Deserialize)]
struct InstanceRow {
    id: u64,
    name: String,
    cost: f64,
    impact: f64,
    category: String,
    #[allow(dead_code)]
    efficiency: Option<f64>,
}

/// Relative output paths for `prepare` are resolved against `Config`'s
/// processed-data directory, so a bare `--portfolio-out portfolio.csv`
/// lands next to the rest of the pipeline's output instead of the CWD.
fn resolve_output_path(config: &Config, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config.processed_data_dir.join(path)
    } else {
        path
    }
}

fn print_report(result: &retention_optimizer::SolveResult) {
    match &result.outcome {
        SolveOutcome::Optimal(solution) => {
            println!("status: optimal");
            println!("selected: {:?}", solution.selected_ids);
            println!("total_cost: {:.2}", solution.total_cost);
            println!("total_value: {:.2}", solution.total_value);
            println!("budget_used_fraction: {:.4}", solution.budget_used_fraction);
        }
        SolveOutcome::NoFeasibleSolution => println!("status: no_feasible_solution"),
        SolveOutcome::Timeout { partial } => {
            println!("status: timeout");
            if let Some(solution) = partial {
                println!("best incumbent total_value: {:.2}", solution.total_value);
            }
        }
        SolveOutcome::Heuristic(solution) => {
            println!("status: heuristic");
            println!("selected: {:?}", solution.selected_ids);
            println!("total_value: {:.2}", solution.total_value);
        }
    }
    if let Some(metrics) = &result.metrics {
        println!(
            "nodes_expanded: {}, pruned_total: {}, pruning_efficiency: {:.3}, elapsed_s: {:.6}",
            metrics.nodes_expanded,
            metrics.pruned_total,
            metrics.pruning_efficiency_fraction,
            metrics.elapsed_seconds
        );
    }
}

fn run() -> Result<ExitCode, DriverError> {
    let config = Config::from_env_or_defaults();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone())),
        )
        .init();
    let args = CommandArgs::parse();

    match args.action {
        Action::Solve {
            input,
            budget,
            deadline_ms,
            output,
        } => {
            let instance = load_instance(&input, budget)?;
            let deadline = deadline_ms
                .map(|ms| Deadline::after(Duration::from_millis(ms)))
                .or_else(|| config.default_deadline.map(Deadline::after));
            let result = solve(&instance, deadline);

            let exit = match &result.outcome {
                SolveOutcome::Optimal(_) | SolveOutcome::Timeout { .. } => ExitCode::SUCCESS,
                SolveOutcome::NoFeasibleSolution => ExitCode::from(2),
                SolveOutcome::Heuristic(_) => unreachable!("solve never returns Heuristic"),
            };

            match output {
                Some(path) => {
                    let file = std::fs::File::create(path)?;
                    serde_json::to_writer_pretty(file, &result)
                        .map_err(retention_optimizer::error::PrepError::from)?;
                }
                None => print_report(&result),
            }

            Ok(exit)
        }
        Action::Greedy { input, budget } => {
            let instance = load_instance(&input, budget)?;
            let result = greedy(&instance);
            print_report(&result);
            Ok(ExitCode::SUCCESS)
        }
        Action::Benchmark { input, budget } => {
            let instance = load_instance(&input, budget)?;
            match run_benchmark(&instance) {
                Ok(bench) => {
                    println!("{}", serde_json::to_string_pretty(&bench).unwrap());
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("benchmark failed: {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Action::Prepare {
            portfolio_out,
            justifications_out,
        } => {
            let portfolio_out = resolve_output_path(&config, portfolio_out);
            let justifications_out = resolve_output_path(&config, justifications_out);
            if let Some(parent) = portfolio_out.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let items = retention_items();
            write_portfolio_csv(&portfolio_out, &items).map_err(DriverError::from)?;
            write_justifications_json(&justifications_out, &retention_portfolio()).map_err(DriverError::from)?;
            println!(
                "wrote {} projects to {} and justifications to {}",
                items.len(),
                portfolio_out.display(),
                justifications_out.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
