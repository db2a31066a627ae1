use thiserror::Error;

/// Errors raised at `Instance` construction time. No partial `Instance` is
/// ever observable when one of these fires.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstanceError {
    #[error("item list must not be empty")]
    EmptyItems,
    #[error("budget must be positive, got {0}")]
    NonPositiveBudget(f64),
    #[error("item {id} has negative cost {cost}")]
    NegativeCost { id: u64, cost: f64 },
    #[error("item {id} has negative value {value}")]
    NegativeValue { id: u64, value: f64 },
}

/// Errors surfaced by the instance-preparation boundary (CSV/IO), never by
/// the solver's hot loop.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The CLI-only error union: wraps every fallible boundary crossed by the
/// driver binary behind one type so `main` can report and set a single exit
/// code.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error(transparent)]
    Prep(#[from] PrepError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
