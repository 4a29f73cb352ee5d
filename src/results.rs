//! Result recording: the append-only JSON-lines sink and the run-scoped
//! execution context.
//!
//! Every record is enriched with the run metadata (`logTime`, `executionID`,
//! `workingSystem`, `runtimeNotes`) at the moment it is written; after that it
//! is never touched again.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use log::debug;
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::error::Result;

pub const RESULTS_FILE: &str = "results.json";

/// Process-wide run state, initialized once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub working_system: String,
    pub runtime_notes: String,
    pub repeat: u32,
    pub sigma_values: Vec<f64>,
    pub timeout: Duration,
    pub run_date: NaiveDateTime,
}

impl ExecutionContext {
    pub fn new(
        working_system: impl Into<String>,
        runtime_notes: impl Into<String>,
        repeat: u32,
        sigma_values: Vec<f64>,
        timeout: Duration,
        run_date: NaiveDateTime,
    ) -> Self {
        ExecutionContext {
            execution_id: Uuid::new_v4().to_string(),
            working_system: working_system.into(),
            runtime_notes: runtime_notes.into(),
            repeat,
            sigma_values,
            timeout,
            run_date,
        }
    }
}

/// Append-only structured record sink, one JSON object per line.
pub struct ResultLog {
    writer: BufWriter<File>,
    path: PathBuf,
    execution_id: String,
    working_system: String,
    runtime_notes: String,
}

impl ResultLog {
    /// Open `results.json` inside an existing run directory.
    pub fn create(run_dir: &Path, ctx: &ExecutionContext) -> Result<Self> {
        let path = run_dir.join(RESULTS_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(ResultLog {
            writer: BufWriter::new(file),
            path,
            execution_id: ctx.execution_id.clone(),
            working_system: ctx.working_system.clone(),
            runtime_notes: ctx.runtime_notes.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enrich one envelope with run metadata and append it to the sink.
    pub fn record(&mut self, mut envelope: Envelope) -> Result<()> {
        envelope.set("logTime", Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string());
        envelope.set("executionID", self.execution_id.as_str());
        envelope.set("workingSystem", self.working_system.as_str());
        envelope.set("runtimeNotes", self.runtime_notes.as_str());

        let line = serde_json::to_string(&envelope)?;
        debug!("Recording result to disk: {line}");
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush buffered records. Called once the run completes.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Name the per-run results directory: `<timestamp>-<workingSystem>`.
pub fn run_dir_name(working_system: &str) -> String {
    format!("{}-{}", Local::now().format("%Y-%m-%d_%H-%M-%S"), working_system)
}
