use std::path::PathBuf;
use std::time::Duration;

/// Paths and toggles the CLI driver needs, gathered in one place and passed
/// down explicitly. The solver itself takes no global configuration; this
/// struct exists only at the driver boundary, following the upstream
/// pipeline's habit of centralizing environment-derived settings without
/// smuggling that state into library code.
#[derive(Debug, Clone)]
pub struct Config {
    pub processed_data_dir: PathBuf,
    pub default_deadline: Option<Duration>,
    pub log_level: String,
}

impl Config {
    /// Builds a `Config` from explicit values, falling back to environment
    /// variables and then hardcoded defaults, in that order.
    pub fn from_env_or_defaults() -> Self {
        Config {
            processed_data_dir: std::env::var("RETENTION_OPTIMIZER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/processed")),
            default_deadline: std::env::var("RETENTION_OPTIMIZER_DEADLINE_MS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_millis),
            log_level: std::env::var("RETENTION_OPTIMIZER_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            processed_data_dir: PathBuf::from("data/processed"),
            default_deadline: None,
            log_level: "info".to_string(),
        }
    }
}
