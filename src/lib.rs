//! chbench: a TPC-CH selectivity benchmark driver for SQL-over-HTTP backends.
//!
//! The driver enumerates a workload of named queries, instantiates each with
//! selectivity-scaled parameters, executes it with bounded-time retry
//! semantics against the configured backend, and records every outcome as one
//! JSON line. Combinations observed to fail are pre-emptively excluded at
//! equal and higher selectivity for the rest of the run.

pub mod client;
pub mod config;
pub mod controller;
pub mod envelope;
pub mod error;
pub mod generator;
pub mod logging;
pub mod natsort;
pub mod queries;
pub mod restart;
pub mod results;
pub mod retry;
pub mod suite;

pub use client::SqlClient;
pub use config::{Backend, Cli, ExperimentConfig};
pub use controller::Controller;
pub use envelope::Envelope;
pub use error::{BenchError, Result};
pub use generator::{ParamGenerator, ParamRange};
pub use restart::RestartHook;
pub use results::{ExecutionContext, ResultLog};
pub use retry::RetryPolicy;
pub use suite::{QueryRunnable, QuerySuite, SigmaRunnable};
