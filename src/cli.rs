use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Argument surface for the `retention-optimizer` binary, kept in the
/// library so the CLI's argument wiring can be tested without spawning a
/// process.
#[derive(Debug, Parser)]
#[command(name = "retention-optimizer")]
pub struct CommandArgs {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Solve an instance exactly with best-first branch and bound.
    Solve {
        #[arg(short, long, value_name = "INSTANCE_CSV")]
        input: PathBuf,
        #[arg(short, long)]
        budget: f64,
        #[arg(long, value_name = "MILLISECONDS")]
        deadline_ms: Option<u64>,
        #[arg(short, long, value_name = "OUTPUT_JSON")]
        output: Option<PathBuf>,
    },
    /// Run the greedy efficiency-order baseline only.
    Greedy {
        #[arg(short, long, value_name = "INSTANCE_CSV")]
        input: PathBuf,
        #[arg(short, long)]
        budget: f64,
    },
    /// Benchmark `solve` on an instance with Criterion.
    Benchmark {
        #[arg(short, long, value_name = "INSTANCE_CSV")]
        input: PathBuf,
        #[arg(short, long)]
        budget: f64,
    },
    /// Write the fixed 15-project retention portfolio and its
    /// justifications to disk.
    Prepare {
        #[arg(long, value_name = "PORTFOLIO_CSV")]
        portfolio_out: PathBuf,
        #[arg(long, value_name = "JUSTIFICATIONS_JSON")]
        justifications_out: PathBuf,
    },
}

impl Action {
    /// Maps a parsed action to the exit code contract for missing/invalid
    /// arguments that `clap` itself does not already reject, kept here so
    /// `main` and tests share one source of truth.
    pub fn input_path(&self) -> Option<&PathBuf> {
        match self {
            Action::Solve { input, .. } | Action::Greedy { input, .. } | Action::Benchmark { input, .. } => {
                Some(input)
            }
            Action::Prepare { .. } => None,
        }
    }
}
