//! HTTP backend adapter: executes one rendered statement against a
//! SQL-over-HTTP query service and normalizes the outcome into an envelope.
//!
//! Failure signaling is by the `status` field in the returned envelope, never
//! by `Err`: a timeout or backend error is a reportable outcome the controller
//! feeds into the exclusion policy. Only transport-level failures (connection
//! refused, reset, DNS, connect timeout) are retried, per the injected policy.
//! `status: "timeout"` is reserved for queries that connected and then ran
//! past their budget.

use std::time::{Duration, Instant};

use log::{debug, warn};
use serde_json::{json, Value};

use crate::envelope::Envelope;
use crate::error::{BenchError, Result};
use crate::retry::RetryPolicy;

/// Budget for establishing a TCP connection. Kept separate from the per-query
/// timeout so a backend that is down never masquerades as a slow query.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct SqlClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
    request_plans: bool,
}

impl SqlClient {
    pub fn new(endpoint: impl Into<String>, retry: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| BenchError::configuration(format!("HTTP client: {e}")))?;
        Ok(SqlClient {
            http,
            endpoint: endpoint.into(),
            retry,
            request_plans: false,
        })
    }

    /// Also ask the backend for its compiled plans (recorded in the result
    /// payload for postmortem analysis, where the backend supports it).
    pub fn with_plans(mut self) -> Self {
        self.request_plans = true;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one statement with the given execution budget.
    ///
    /// The returned envelope always carries `statement`, and `clientTime`
    /// measured strictly around the network call. Transport failures are
    /// retried with the policy's fixed backoff; a genuine timeout is reported
    /// once as `status: "timeout"` and returned immediately.
    pub async fn execute(&self, statement: &str, timeout: Duration) -> Envelope {
        let lean = lean_statement(statement);
        let body = self.request_body(&lean);

        let mut attempts: u32 = 0;
        loop {
            debug!("Issuing query \"{lean}\" to {}.", self.endpoint);
            let before = Instant::now();
            let outcome = self.post_once(&body, timeout).await;
            let client_time = before.elapsed().as_secs_f64();

            match outcome {
                Ok(value) => {
                    let mut env = Envelope::from_value(value);
                    env.set("clientTime", client_time);
                    if !env.is_success() {
                        warn!(
                            "Status of executing statement {lean} not successful, but instead {}.",
                            env.status()
                        );
                        warn!(
                            "JSON dump: {}",
                            serde_json::to_string(&env).unwrap_or_default()
                        );
                    }
                    env.set("statement", lean);
                    return env;
                }
                // The per-request timeout is a total budget that also covers
                // connection establishment, so an unreachable backend can
                // elapse it too. Those are transport failures: only a query
                // that connected and then overran its budget is a timeout.
                Err(e) if e.is_timeout() && !e.is_connect() => {
                    warn!(
                        "Statement {lean} has run longer than the specified timeout {:?}.",
                        timeout
                    );
                    let mut env = Envelope::timeout(e.to_string());
                    env.set("clientTime", client_time);
                    env.set("statement", lean);
                    return env;
                }
                Err(e) if e.is_decode() => {
                    // The backend answered but the body was not the JSON we
                    // expect. Not a transport failure, so no retry.
                    warn!("Undecodable response for statement {lean}: {e}.");
                    let mut env = Envelope::error_status(e.to_string());
                    env.set("clientTime", client_time);
                    env.set("statement", lean);
                    return env;
                }
                Err(e) => {
                    attempts += 1;
                    if !self.retry.allows_retry(attempts) {
                        warn!("Transport retries exhausted for statement {lean}: {e}.");
                        let mut env = Envelope::error_status(e.to_string());
                        env.set("clientTime", client_time);
                        env.set("statement", lean);
                        return env;
                    }
                    warn!(
                        "Exception caught: {e}. Restarting the query in {} seconds...",
                        self.retry.backoff.as_secs()
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                }
            }
        }
    }

    async fn post_once(&self, body: &Value, timeout: Duration) -> reqwest::Result<Value> {
        self.http
            .post(&self.endpoint)
            .timeout(timeout)
            .json(body)
            .send()
            .await?
            .json()
            .await
    }

    fn request_body(&self, lean: &str) -> Value {
        if self.request_plans {
            json!({
                "statement": lean,
                "plan-format": "STRING",
                "logical-plan": true,
                "optimized-logical-plan": true,
                "job": true,
            })
        } else {
            json!({ "statement": lean })
        }
    }
}

/// Collapse a multi-line statement to single-space-separated text, matching
/// what gets logged and recorded in the envelope.
pub fn lean_statement(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}
