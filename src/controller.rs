//! The outer experiment driver: repeat × sigma × suite, with the exclusion
//! escalation policy.
//!
//! Selectivity is monotonic in query cost for this workload, so a query that
//! fails at sigma is assumed to fail at every higher sigma too; all of those
//! combinations are pre-emptively skipped for the remainder of the run. The
//! exclusion set grows monotonically and is scoped to one controller.

use std::collections::HashSet;
use std::time::Instant;

use log::{info, warn};
use rand::Rng;

use crate::error::Result;
use crate::restart::RestartHook;
use crate::results::{ExecutionContext, ResultLog};
use crate::suite::QuerySuite;

pub struct Controller<'a> {
    ctx: &'a ExecutionContext,
    restart: Option<RestartHook>,
    /// Excluded (sigma, query) combinations, with sigma keyed by its position
    /// in the configured level list.
    exclusions: HashSet<(usize, String)>,
}

impl<'a> Controller<'a> {
    pub fn new(ctx: &'a ExecutionContext, restart: Option<RestartHook>) -> Self {
        Controller { ctx, restart, exclusions: HashSet::new() }
    }

    pub fn is_excluded(&self, sigma_index: usize, query: &str) -> bool {
        self.exclusions.contains(&(sigma_index, query.to_string()))
    }

    /// Drive the full experiment. A fresh suite is constructed for every
    /// (run, sigma) pass; per-query failures are data, not faults, so the
    /// only errors surfaced here are result-sink failures.
    pub async fn run<F, R>(
        &mut self,
        mut make_suite: F,
        log: &mut ResultLog,
        rng: &mut R,
    ) -> Result<()>
    where
        F: FnMut() -> QuerySuite,
        R: Rng,
    {
        let ctx = self.ctx;
        for run in 0..ctx.repeat {
            for (sigma_index, &sigma) in ctx.sigma_values.iter().enumerate() {
                for runnable in make_suite() {
                    if self.is_excluded(sigma_index, runnable.id()) {
                        info!(
                            "Skipping query {} with sigma {sigma} @ run {}.",
                            runnable.id(),
                            run + 1
                        );
                        continue;
                    }

                    info!(
                        "Executing query {} with sigma {sigma} @ run {}.",
                        runnable.id(),
                        run + 1
                    );
                    let before = Instant::now();
                    let mut envelope = runnable.call(sigma, ctx.timeout, rng).await;
                    // No-op runnables never touch the network; give their
                    // records a client time too.
                    envelope.set_if_absent("clientTime", before.elapsed().as_secs_f64());
                    envelope.set("runNumber", run);

                    let succeeded = envelope.is_success();
                    log.record(envelope)?;

                    if !succeeded {
                        warn!(
                            "Query {} was not successful. No longer running sigma >= {sigma} for it.",
                            runnable.id()
                        );
                        for (index, &level) in ctx.sigma_values.iter().enumerate() {
                            if level >= sigma {
                                self.exclusions.insert((index, runnable.id().to_string()));
                            }
                        }
                        if let Some(hook) = &self.restart {
                            info!("Restarting the working system.");
                            hook.run().await;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Envelope;
    use crate::generator::ParamGenerator;
    use crate::suite::{BoxFuture, QueryRunnable};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedQuery {
        id: &'static str,
        status: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl QueryRunnable for ScriptedQuery {
        fn id(&self) -> &str {
            self.id
        }

        fn generator(&self) -> ParamGenerator {
            ParamGenerator::Items
        }

        fn invoke<'a>(&'a self, _: &'a str, _: &'a str, _: Duration) -> BoxFuture<'a, Envelope> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let mut env = Envelope::new();
                env.set("status", self.status);
                env.set("clientTime", 0.001);
                env
            })
        }
    }

    fn ctx(repeat: u32, sigmas: Vec<f64>) -> ExecutionContext {
        ExecutionContext::new(
            "TestSystem",
            "",
            repeat,
            sigmas,
            Duration::from_secs(1),
            NaiveDate::from_ymd_opt(2014, 12, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        )
    }

    fn scripted_suite(
        failing: &'static str,
        calls_1: &Arc<AtomicUsize>,
        calls_6: &Arc<AtomicUsize>,
    ) -> QuerySuite {
        QuerySuite::new(
            vec![
                Box::new(ScriptedQuery {
                    id: "1",
                    status: failing,
                    calls: Arc::clone(calls_1),
                }),
                Box::new(ScriptedQuery {
                    id: "6",
                    status: "success",
                    calls: Arc::clone(calls_6),
                }),
            ],
            &[],
        )
    }

    fn read_records(path: &std::path::Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn failure_excludes_higher_sigma_levels() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(1, vec![10.0, 50.0]);
        let mut log = ResultLog::create(dir.path(), &ctx).unwrap();
        let mut controller = Controller::new(&ctx, None);
        let calls_1 = Arc::new(AtomicUsize::new(0));
        let calls_6 = Arc::new(AtomicUsize::new(0));

        let mut rng = StdRng::seed_from_u64(1);
        controller
            .run(|| scripted_suite("error", &calls_1, &calls_6), &mut log, &mut rng)
            .await
            .unwrap();
        log.finish().unwrap();

        // (10,"1") fails, (10,"6") and (50,"6") run, (50,"1") is skipped
        // without a record.
        let records = read_records(&dir.path().join(crate::results::RESULTS_FILE));
        assert_eq!(records.len(), 3);
        assert_eq!(calls_1.load(Ordering::SeqCst), 1);
        assert_eq!(calls_6.load(Ordering::SeqCst), 2);
        assert_eq!(records[0]["query"], "1");
        assert_eq!(records[0]["status"], "error");
        assert_eq!(records[0]["sigma"], 10.0);
        assert_eq!(records[1]["query"], "6");
        assert_eq!(records[2]["sigma"], 50.0);
        assert!(controller.is_excluded(1, "1"));
    }

    #[tokio::test]
    async fn exclusion_persists_across_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(2, vec![10.0, 50.0]);
        let mut log = ResultLog::create(dir.path(), &ctx).unwrap();
        let mut controller = Controller::new(&ctx, None);
        let calls_1 = Arc::new(AtomicUsize::new(0));
        let calls_6 = Arc::new(AtomicUsize::new(0));

        let mut rng = StdRng::seed_from_u64(2);
        controller
            .run(|| scripted_suite("timeout", &calls_1, &calls_6), &mut log, &mut rng)
            .await
            .unwrap();
        log.finish().unwrap();

        // Once excluded, never re-attempted in any later repeat.
        assert_eq!(calls_1.load(Ordering::SeqCst), 1);
        assert_eq!(calls_6.load(Ordering::SeqCst), 4);
        let records = read_records(&dir.path().join(crate::results::RESULTS_FILE));
        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn lower_sigma_levels_stay_active_after_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        // Descending order: the failure at 50 must not exclude 10.
        let ctx = ctx(1, vec![50.0, 10.0]);
        let mut log = ResultLog::create(dir.path(), &ctx).unwrap();
        let mut controller = Controller::new(&ctx, None);
        let calls_1 = Arc::new(AtomicUsize::new(0));
        let calls_6 = Arc::new(AtomicUsize::new(0));

        let mut rng = StdRng::seed_from_u64(3);
        controller
            .run(|| scripted_suite("error", &calls_1, &calls_6), &mut log, &mut rng)
            .await
            .unwrap();
        log.finish().unwrap();

        assert_eq!(calls_1.load(Ordering::SeqCst), 2);
        let records = read_records(&dir.path().join(crate::results::RESULTS_FILE));
        assert_eq!(records.len(), 4);
        assert!(controller.is_excluded(0, "1"));
        assert!(controller.is_excluded(1, "1"));
    }

    #[tokio::test]
    async fn records_carry_run_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx(1, vec![10.0]);
        let mut log = ResultLog::create(dir.path(), &ctx).unwrap();
        let mut controller = Controller::new(&ctx, None);
        let calls_1 = Arc::new(AtomicUsize::new(0));
        let calls_6 = Arc::new(AtomicUsize::new(0));

        let mut rng = StdRng::seed_from_u64(4);
        controller
            .run(|| scripted_suite("success", &calls_1, &calls_6), &mut log, &mut rng)
            .await
            .unwrap();
        log.finish().unwrap();

        let records = read_records(&dir.path().join(crate::results::RESULTS_FILE));
        for record in &records {
            assert_eq!(record["runNumber"], 0);
            assert_eq!(record["executionID"], ctx.execution_id);
            assert_eq!(record["workingSystem"], "TestSystem");
            assert_eq!(record["generator"], "items");
            assert!(record["valueRange"].is_object());
            assert!(record["clientTime"].is_number());
        }
    }
}
