//! Query descriptors and the suite protocol.
//!
//! A suite owns an ordered list of query runnables and exposes them as a
//! one-shot, forward-only sequence of selectivity-aware units. Exclusion by
//! query name happens at construction time; re-iterating requires building a
//! fresh suite.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::Rng;

use crate::client::SqlClient;
use crate::envelope::Envelope;
use crate::generator::ParamGenerator;
use crate::natsort::natural_cmp;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One benchmark query: a stable identifier, the generator domain it draws
/// from, and the backend-specific execution closure.
pub trait QueryRunnable: Send + Sync {
    /// Stable identifier, unique within a suite.
    fn id(&self) -> &str;

    /// Which parameter domain this query draws from. Fixed per query.
    fn generator(&self) -> ParamGenerator;

    /// Execute with the generated bounds and the configured budget.
    fn invoke<'a>(&'a self, v0: &'a str, v1: &'a str, timeout: Duration)
        -> BoxFuture<'a, Envelope>;
}

/// A query backed by a rendered statement submitted through the HTTP adapter.
pub struct StatementQuery {
    id: &'static str,
    generator: ParamGenerator,
    client: SqlClient,
    render: Box<dyn Fn(&str, &str) -> String + Send + Sync>,
}

impl StatementQuery {
    pub fn new(
        id: &'static str,
        generator: ParamGenerator,
        client: SqlClient,
        render: impl Fn(&str, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        StatementQuery { id, generator, client, render: Box::new(render) }
    }
}

impl QueryRunnable for StatementQuery {
    fn id(&self) -> &str {
        self.id
    }

    fn generator(&self) -> ParamGenerator {
        self.generator
    }

    fn invoke<'a>(
        &'a self,
        v0: &'a str,
        v1: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Envelope> {
        Box::pin(async move {
            let statement = (self.render)(v0, v1);
            self.client.execute(&statement, timeout).await
        })
    }
}

/// Placeholder for a query the backend cannot express. Downstream aggregation
/// expects one record per (run, sigma, query) tuple for every query nominally
/// in the workload, so the query is substituted rather than omitted.
pub struct NoOpRunnable {
    id: &'static str,
    generator: ParamGenerator,
}

impl NoOpRunnable {
    pub fn new(id: &'static str, generator: ParamGenerator) -> Self {
        NoOpRunnable { id, generator }
    }
}

impl QueryRunnable for NoOpRunnable {
    fn id(&self) -> &str {
        self.id
    }

    fn generator(&self) -> ParamGenerator {
        self.generator
    }

    fn invoke<'a>(&'a self, _: &'a str, _: &'a str, _: Duration) -> BoxFuture<'a, Envelope> {
        Box::pin(async {
            let mut env = Envelope::success();
            env.set("detail", "Not implemented.");
            env
        })
    }
}

/// An ordered, filtered, single-pass collection of query runnables.
pub struct QuerySuite {
    queue: VecDeque<Box<dyn QueryRunnable>>,
}

impl QuerySuite {
    /// Filter out excluded identifiers (case-insensitive), then order the
    /// remainder under natural identifier ordering.
    pub fn new(runnables: Vec<Box<dyn QueryRunnable>>, exclude: &[String]) -> Self {
        let mut kept: Vec<Box<dyn QueryRunnable>> = runnables
            .into_iter()
            .filter(|r| !exclude.iter().any(|e| e.eq_ignore_ascii_case(r.id())))
            .collect();
        kept.sort_by(|a, b| natural_cmp(a.id(), b.id()));
        QuerySuite { queue: kept.into() }
    }

    /// Remaining identifiers, in yield order.
    pub fn identifiers(&self) -> Vec<String> {
        self.queue.iter().map(|r| r.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Iterator for QuerySuite {
    type Item = SigmaRunnable;

    fn next(&mut self) -> Option<SigmaRunnable> {
        self.queue.pop_front().map(|runnable| SigmaRunnable { runnable })
    }
}

/// A selectivity-aware executable unit wrapping one query runnable.
pub struct SigmaRunnable {
    runnable: Box<dyn QueryRunnable>,
}

impl SigmaRunnable {
    pub fn id(&self) -> &str {
        self.runnable.id()
    }

    /// Generate bounds for `sigma`, invoke the query, and decorate the result
    /// with the suite-level fields every record carries.
    pub async fn call<R: Rng>(&self, sigma: f64, timeout: Duration, rng: &mut R) -> Envelope {
        let generator = self.runnable.generator();
        let range = generator.generate(sigma, rng);
        let (v0, v1) = (range.v0(), range.v1());
        let mut env = self.runnable.invoke(&v0, &v1, timeout).await;
        env.set("generator", generator.name());
        env.set("valueRange", range.to_json());
        env.set("sigma", sigma);
        env.set("query", self.runnable.id());
        env
    }
}
