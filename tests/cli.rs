use clap::Parser;
use retention_optimizer::cli::{Action, CommandArgs};

#[test]
fn solve_subcommand_wires_budget_and_input() {
    let args = CommandArgs::try_parse_from([
        "retention-optimizer",
        "solve",
        "--input",
        "fixtures/instance.csv",
        "--budget",
        "250.5",
    ])
    .unwrap();

    match args.action {
        Action::Solve { input, budget, deadline_ms, output } => {
            assert_eq!(input.to_str().unwrap(), "fixtures/instance.csv");
            assert_eq!(budget, 250.5);
            assert_eq!(deadline_ms, None);
            assert_eq!(output, None);
        }
        other => panic!("expected Solve, got {other:?}"),
    }
}

#[test]
fn greedy_subcommand_requires_budget() {
    let result = CommandArgs::try_parse_from(["retention-optimizer", "greedy", "--input", "fixtures/instance.csv"]);
    assert!(result.is_err());
}

#[test]
fn prepare_subcommand_has_no_positional_input() {
    let args = CommandArgs::try_parse_from([
        "retention-optimizer",
        "prepare",
        "--portfolio-out",
        "portfolio.csv",
        "--justifications-out",
        "justifications.json",
    ])
    .unwrap();

    assert!(args.action.input_path().is_none());
}

#[test]
fn unknown_subcommand_is_rejected() {
    let result = CommandArgs::try_parse_from(["retention-optimizer", "explode"]);
    assert!(result.is_err());
}
