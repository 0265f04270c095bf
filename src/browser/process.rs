//! Firefox child process.
//!
//! Firefox prints its BiDi endpoint to stderr once the remote agent is up:
//!
//! ```text
//! WebDriver BiDi listening on ws://127.0.0.1:41237
//! ```
//!
//! [`FirefoxProcess::launch`] waits for that line (bounded by the startup
//! timeout), then keeps draining stderr so the pipe never blocks the browser.

// ============================================================================
// Imports
// ============================================================================

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio::time::timeout_at;
use tracing::{debug, info, trace};

use crate::config::deadline_after;
use crate::error::{Error, Result};

use super::options::LaunchOptions;
use super::profile::Profile;

// ============================================================================
// Constants
// ============================================================================

/// Matches the endpoint announcement and captures the `ws://` URL.
const ENDPOINT_PATTERN: &str = r"WebDriver BiDi listening on (ws://\S+)";

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
struct ProcessGuard {
    /// The child process handle.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Kills the process and waits for it to exit.
    async fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            debug!(pid = self.pid, "Killing Firefox process");
            if let Err(e) = child.kill().await {
                debug!(pid = self.pid, error = %e, "Failed to kill process");
            }
            if let Err(e) = child.wait().await {
                debug!(pid = self.pid, error = %e, "Failed to wait for process");
            }
            info!(pid = self.pid, "Process terminated");
        }
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// FirefoxProcess
// ============================================================================

/// A running Firefox with a known BiDi endpoint.
pub(crate) struct FirefoxProcess {
    guard: ProcessGuard,
    endpoint: String,
}

impl FirefoxProcess {
    /// Starts Firefox on `profile` and waits for its BiDi endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcessLaunchFailed`] if the binary cannot be started or
    ///   exits before announcing the endpoint
    /// - [`Error::ConnectionTimeout`] if no endpoint is announced in time
    pub(crate) async fn launch(options: &LaunchOptions, profile: &Profile) -> Result<Self> {
        let mut args: Vec<OsString> = vec![
            "--profile".into(),
            profile.path().into(),
            "--no-remote".into(),
            "--new-instance".into(),
        ];
        args.extend(options.to_args().into_iter().map(OsString::from));

        Self::spawn(&options.binary, &args, options.startup_timeout).await
    }

    /// Spawns `binary args…` and reads stderr until the endpoint appears.
    async fn spawn(binary: &Path, args: &[OsString], startup_timeout: Duration) -> Result<Self> {
        let pattern = Regex::new(ENDPOINT_PATTERN).map_err(|e| Error::protocol(e.to_string()))?;

        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Error::process_launch_failed)?;

        let stderr = child.stderr.take();
        let mut guard = ProcessGuard::new(child);
        info!(pid = guard.pid, binary = %binary.display(), "Firefox process spawned");

        let Some(stderr) = stderr else {
            guard.kill().await;
            return Err(launch_failed("stderr was not captured"));
        };

        let deadline = deadline_after(startup_timeout);
        match timeout_at(deadline, read_endpoint(stderr, &pattern)).await {
            Ok(Ok(endpoint)) => {
                debug!(pid = guard.pid, endpoint = %endpoint, "BiDi endpoint announced");
                Ok(Self { guard, endpoint })
            }
            Ok(Err(e)) => {
                guard.kill().await;
                Err(e)
            }
            Err(_) => {
                guard.kill().await;
                Err(Error::connection_timeout(startup_timeout.as_millis() as u64))
            }
        }
    }

    /// Returns the URL for a new BiDi session.
    #[inline]
    pub(crate) fn session_url(&self) -> String {
        format!("{}/session", self.endpoint.trim_end_matches('/'))
    }

    /// Returns the process ID.
    #[inline]
    pub(crate) fn pid(&self) -> u32 {
        self.guard.pid
    }

    /// Kills the process and waits for it to exit.
    pub(crate) async fn kill(&mut self) {
        self.guard.kill().await;
    }
}

/// Reads lines until the endpoint line, then hands stderr to a drain task.
async fn read_endpoint(stderr: ChildStderr, pattern: &Regex) -> Result<String> {
    let mut lines = BufReader::new(stderr).lines();

    while let Some(line) = lines.next_line().await? {
        trace!(line = %line, "firefox stderr");

        if let Some(endpoint) = parse_endpoint(pattern, &line) {
            tokio::spawn(async move {
                while let Ok(Some(line)) = lines.next_line().await {
                    trace!(line = %line, "firefox stderr");
                }
            });
            return Ok(endpoint);
        }
    }

    Err(launch_failed(
        "process exited before announcing a BiDi endpoint",
    ))
}

fn parse_endpoint(pattern: &Regex, line: &str) -> Option<String> {
    pattern
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

fn launch_failed(message: &str) -> Error {
    Error::ProcessLaunchFailed {
        message: message.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
