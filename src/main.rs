use std::fs;

use anyhow::Context as _;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use chbench::config::{Cli, ExperimentConfig};
use chbench::controller::Controller;
use chbench::restart::RestartHook;
use chbench::results::{self, ExecutionContext, ResultLog};
use chbench::retry::RetryPolicy;
use chbench::{logging, queries, SqlClient};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("chbench: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let experiment = ExperimentConfig::load(&cli.experiment)?;

    // Each run gets its own directory holding the log and the result sink.
    let run_dir = cli.output_dir.join(results::run_dir_name(cli.system_name()));
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating results directory {}", run_dir.display()))?;
    logging::init(&cli.log_level, &run_dir.join("chbench.log"))?;

    info!(
        "Benchmarking {} ({:?} dialect) with experiment {}.",
        cli.url,
        cli.backend,
        cli.experiment.display()
    );

    let ctx = ExecutionContext::new(
        cli.system_name(),
        &cli.notes,
        experiment.repeat,
        experiment.sigma_values.clone(),
        experiment.query_timeout(),
        experiment.run_date()?,
    );
    info!("Working with execution id: {}.", ctx.execution_id);

    let mut client = SqlClient::new(&cli.url, RetryPolicy::default())?;
    if cli.plans {
        client = client.with_plans();
    }

    let restart = experiment
        .restart_argv()
        .map(|argv| RestartHook::new(argv.to_vec()));
    let mut result_log = ResultLog::create(&run_dir, &ctx)?;
    let mut controller = Controller::new(&ctx, restart);
    let mut rng = StdRng::from_entropy();

    let run_date = ctx.run_date;
    let exclude = experiment.exclude_queries.clone();
    info!("Executing the benchmark.");
    controller
        .run(
            || queries::suite_for(cli.backend, &client, run_date, &cli.keyspace, &exclude),
            &mut result_log,
            &mut rng,
        )
        .await?;

    result_log.finish()?;
    info!(
        "Benchmark has finished executing. Results in {}.",
        run_dir.display()
    );
    Ok(())
}
