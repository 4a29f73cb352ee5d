//! External backend-restart collaborator.
//!
//! After an excluding failure the controller may hand control to an external
//! command (typically a script that bounces the backend). Output is streamed
//! into the debug log; a restart failure is reported but never aborts the run.

use std::process::Stdio;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct RestartHook {
    argv: Vec<String>,
}

impl RestartHook {
    /// `argv[0]` is the program, the rest its arguments. Empty argv is a
    /// configuration error caught upstream.
    pub fn new(argv: Vec<String>) -> Self {
        RestartHook { argv }
    }

    pub async fn run(&self) {
        if self.argv.is_empty() {
            warn!("Restart hook configured with an empty command.");
            return;
        }
        debug!("Invoking restart command: {:?}", self.argv);
        let mut command = Command::new(&self.argv[0]);
        command
            .args(&self.argv[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!("Restart command {:?} failed to spawn: {e}.", self.argv);
                return;
            }
        };

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    debug!("{line}");
                }
            }
        }
        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !line.trim().is_empty() {
                    debug!("{line}");
                }
            }
        }

        match child.wait().await {
            Ok(status) if status.success() => debug!("Restart command completed."),
            Ok(status) => warn!("Restart command exited with {status}."),
            Err(e) => warn!("Restart command did not complete: {e}."),
        }
    }
}
