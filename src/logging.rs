// Logging setup — powered by tracing-subscriber.
//
// The crate logs through the `log` macros; `tracing_log::LogTracer` bridges
// those into the tracing subscriber. Two layers: a colored console layer at
// the configured level, and a plain append-mode file layer inside the per-run
// results directory so each run carries its own log.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::Result;

/// Build the `EnvFilter` from the base level plus hardcoded noisy-crate
/// overrides.
fn build_env_filter(level: &str) -> Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("hyper", "warn"),
        ("hyper_util", "warn"),
        ("reqwest", "warn"),
        ("h2", "warn"),
        ("rustls", "warn"),
    ];
    for (target, lvl) in noisy {
        directives.push(format!("{target}={lvl}"));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str).map_err(|e| {
        crate::error::BenchError::configuration(format!("invalid log filter '{filter_str}': {e}"))
    })
}

/// Initialize logging with a console layer and a file layer under `log_path`.
pub fn init(level: &str, log_path: &Path) -> Result<()> {
    let log_file = OpenOptions::new().create(true).append(true).open(log_path)?;

    // Bridge `log` crate → tracing; ok() in case already initialized
    tracing_log::LogTracer::init().ok();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_target(true)
        .with_filter(build_env_filter(level)?);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(log_file)
        .with_target(true)
        .with_filter(build_env_filter("debug")?);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
