//! Per-backend TPC-CH workload content.
//!
//! Each module declares its query table explicitly: an ordered list of
//! statically known identifiers mapped to statement renderers. Suites are
//! one-shot; the controller constructs a fresh one per pass.

pub mod n1ql;
pub mod sqlpp;

use chrono::NaiveDateTime;

use crate::client::SqlClient;
use crate::config::Backend;
use crate::suite::QuerySuite;

/// Construct a fresh suite for the configured backend dialect.
pub fn suite_for(
    backend: Backend,
    client: &SqlClient,
    run_date: NaiveDateTime,
    keyspace: &str,
    exclude: &[String],
) -> QuerySuite {
    match backend {
        Backend::Sqlpp => sqlpp::suite(client, run_date, exclude),
        Backend::N1ql => n1ql::suite(client, run_date, keyspace, exclude),
    }
}
