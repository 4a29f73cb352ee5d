//! CLI flags and the JSON experiment file.
//!
//! Connection-level knobs come from the command line (with env fallbacks);
//! the experiment itself (selectivity levels, repeat count, timeout, excluded
//! queries, run date) lives in a JSON file so runs are reproducible.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDateTime;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::error::{BenchError, Result};
use crate::generator::DATE_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQL++ dialect (AsterixDB-style query service).
    Sqlpp,
    /// N1QL dialect (keyspace-qualified UNNEST).
    N1ql,
}

impl Backend {
    pub fn default_system_name(&self) -> &'static str {
        match self {
            Backend::Sqlpp => "sqlpp",
            Backend::N1ql => "n1ql",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "chbench", about = "TPC-CH selectivity benchmark driver")]
pub struct Cli {
    /// Query service endpoint.
    /// Example: --url http://localhost:19002/query/service
    #[arg(long, default_value = "http://localhost:19002/query/service", env = "CHBENCH_URL")]
    pub url: String,

    /// Query dialect of the target backend
    #[arg(long, value_enum, default_value = "sqlpp")]
    pub backend: Backend,

    /// Working-system name recorded in every result record
    /// (defaults to the dialect name)
    #[arg(long)]
    pub system: Option<String>,

    /// Path to the experiment file
    #[arg(long, default_value = "config/experiment.json")]
    pub experiment: PathBuf,

    /// Keyspace prefix for the n1ql dialect
    #[arg(long, default_value = "tpcch._default")]
    pub keyspace: String,

    /// Base directory for per-run results
    #[arg(long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Any notes to append to each result record
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Also record the backend's compiled plans in each result payload
    #[arg(long, default_value_t = false)]
    pub plans: bool,

    /// Base log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CHBENCH_LOG")]
    pub log_level: String,
}

impl Cli {
    pub fn system_name(&self) -> &str {
        self.system
            .as_deref()
            .unwrap_or_else(|| self.backend.default_system_name())
    }
}

/// The experiment file. Field names mirror the result-record vocabulary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentConfig {
    pub sigma_values: Vec<f64>,
    pub repeat: u32,
    /// Per-query execution budget in seconds.
    pub timeout: f64,
    #[serde(default)]
    pub exclude_queries: Vec<String>,
    /// Benchmark run date anchoring the date domain, `YYYY-MM-DD HH:MM:SS`.
    pub run_date: String,
    /// Optional argv for the backend-restart collaborator.
    #[serde(default)]
    pub restart_command: Vec<String>,
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            BenchError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: ExperimentConfig = serde_json::from_str(&text).map_err(|e| {
            BenchError::configuration(format!("malformed {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sigma_values.is_empty() {
            return Err(BenchError::configuration("sigmaValues must not be empty"));
        }
        for &sigma in &self.sigma_values {
            if !(0.0..=100.0).contains(&sigma) {
                return Err(BenchError::configuration(format!(
                    "sigma value {sigma} outside [0, 100]"
                )));
            }
        }
        if self.repeat == 0 {
            return Err(BenchError::configuration("repeat must be at least 1"));
        }
        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            return Err(BenchError::configuration(format!(
                "timeout {} is not a positive number of seconds",
                self.timeout
            )));
        }
        self.run_date()?;
        Ok(())
    }

    pub fn run_date(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.run_date, DATE_FORMAT).map_err(|e| {
            BenchError::configuration(format!("runDate {:?}: {e}", self.run_date))
        })
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    pub fn restart_argv(&self) -> Option<&[String]> {
        if self.restart_command.is_empty() {
            None
        } else {
            Some(&self.restart_command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cli_defaults_cover_a_local_run() {
        let cli = Cli::try_parse_from(["chbench"]).unwrap();
        assert_eq!(cli.backend, Backend::Sqlpp);
        assert_eq!(cli.system_name(), "sqlpp");
        assert_eq!(cli.url, "http://localhost:19002/query/service");
        assert!(!cli.plans);
    }

    #[test]
    fn system_flag_overrides_the_dialect_name() {
        let cli = Cli::try_parse_from(["chbench", "--backend", "n1ql", "--system", "Couchbase"])
            .unwrap();
        assert_eq!(cli.backend, Backend::N1ql);
        assert_eq!(cli.system_name(), "Couchbase");
    }

    #[test]
    fn loads_a_complete_experiment_file() {
        let file = write_config(
            r#"{
                "sigmaValues": [0, 1, 10, 50, 100],
                "repeat": 3,
                "timeout": 300,
                "excludeQueries": ["15"],
                "runDate": "2014-12-01 00:00:00",
                "restartCommand": ["scripts/restart.sh"]
            }"#,
        );
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert_eq!(config.sigma_values.len(), 5);
        assert_eq!(config.repeat, 3);
        assert_eq!(config.query_timeout(), Duration::from_secs(300));
        assert_eq!(config.exclude_queries, vec!["15"]);
        assert_eq!(config.restart_argv().unwrap(), ["scripts/restart.sh"]);
        assert!(config.run_date().is_ok());
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let file = write_config(
            r#"{
                "sigmaValues": [10],
                "repeat": 1,
                "timeout": 60,
                "runDate": "2014-12-01 00:00:00"
            }"#,
        );
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert!(config.exclude_queries.is_empty());
        assert!(config.restart_argv().is_none());
    }

    #[test]
    fn rejects_out_of_range_sigma() {
        let file = write_config(
            r#"{
                "sigmaValues": [10, 101],
                "repeat": 1,
                "timeout": 60,
                "runDate": "2014-12-01 00:00:00"
            }"#,
        );
        assert!(matches!(
            ExperimentConfig::load(file.path()),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_unparseable_run_date() {
        let file = write_config(
            r#"{
                "sigmaValues": [10],
                "repeat": 1,
                "timeout": 60,
                "runDate": "December 1st"
            }"#,
        );
        assert!(matches!(
            ExperimentConfig::load(file.path()),
            Err(BenchError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_zero_repeat_and_nonpositive_timeout() {
        let file = write_config(
            r#"{
                "sigmaValues": [10],
                "repeat": 0,
                "timeout": 60,
                "runDate": "2014-12-01 00:00:00"
            }"#,
        );
        assert!(ExperimentConfig::load(file.path()).is_err());

        let file = write_config(
            r#"{
                "sigmaValues": [10],
                "repeat": 1,
                "timeout": 0,
                "runDate": "2014-12-01 00:00:00"
            }"#,
        );
        assert!(ExperimentConfig::load(file.path()).is_err());
    }
}
