//! Subprocess runner built on `tokio::process`.
//!
//! The child inherits the parent's standard streams and environment. It is
//! spawned with `kill_on_drop`, so an early return never leaves it orphaned,
//! and a timed-out child is killed and reaped before the error is returned.

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::process::{Child, Command};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::{CommandSpec, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Process runner options.
#[derive(Debug, Clone)]
pub struct ProcessRunnerOptions {
    /// Keep waiting for the child when the user presses Ctrl-C.
    ///
    /// The child sits in the same foreground process group and receives the
    /// interrupt itself; engines like terraform may need several of them.
    /// Enabling this replaces the default SIGINT handler for the rest of the
    /// process. Once an interrupt has been seen, the current run and every
    /// later one fail with [`RunnerError::Interrupted`].
    pub tolerate_interrupts: bool,
    /// CI mode (timestamped completion lines)
    pub ci_mode: bool,
}

impl Default for ProcessRunnerOptions {
    fn default() -> Self {
        Self {
            tolerate_interrupts: true,
            ci_mode: std::env::var("CI").is_ok(),
        }
    }
}

impl ProcessRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ci_mode(mut self) -> Self {
        self.ci_mode = true;
        self
    }

    pub fn tolerate_interrupts(mut self, enabled: bool) -> Self {
        self.tolerate_interrupts = enabled;
        self
    }
}

/// Ctrl-C state shared by every run of one runner.
#[derive(Debug, Default)]
struct InterruptState {
    listening: AtomicBool,
    received: AtomicBool,
    notify: Notify,
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
    interrupts: Arc<InterruptState>,
}

impl ProcessRunner {
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self {
            options,
            interrupts: Arc::default(),
        }
    }

    /// Whether Ctrl-C has been pressed since the first run.
    pub fn interrupted(&self) -> bool {
        self.interrupts.received.load(Ordering::SeqCst)
    }

    /// Install a listener that outlives single runs, so an interrupt pressed
    /// between two steps is not lost.
    fn listen_for_interrupts(&self) -> RunnerResult<()> {
        if !self.options.tolerate_interrupts || self.interrupts.listening.load(Ordering::SeqCst) {
            return Ok(());
        }

        // registered here, before any child is spawned
        #[cfg(unix)]
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

        let state = Arc::clone(&self.interrupts);
        tokio::spawn(async move {
            loop {
                #[cfg(unix)]
                let received = sigint.recv().await.is_some();
                #[cfg(not(unix))]
                let received = tokio::signal::ctrl_c().await.is_ok();

                if !received {
                    break;
                }
                state.received.store(true, Ordering::SeqCst);
                state.notify.notify_waiters();
            }
        });
        self.interrupts.listening.store(true, Ordering::SeqCst);

        Ok(())
    }

    fn build_command(&self, spec: &CommandSpec, run_config: &RunConfig) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }
        if run_config.inherit_stdio {
            cmd.stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Wait for the child, honouring the timeout and tolerating interrupts.
    async fn wait_for(
        &self,
        child: &mut Child,
        command: &str,
        run_config: &RunConfig,
    ) -> RunnerResult<ExitStatus> {
        let timeout = async {
            if run_config.timeout_seconds > 0 {
                tokio::time::sleep(Duration::from_secs(run_config.timeout_seconds)).await;
            } else {
                std::future::pending::<()>().await;
            }
        };
        tokio::pin!(timeout);

        loop {
            tokio::select! {
                status = child.wait() => {
                    return status.map_err(|e| {
                        RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
                    });
                }
                _ = &mut timeout => {
                    error!(
                        "Command exceeded {}s, killing: {}",
                        run_config.timeout_seconds, command
                    );
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill timed-out process: {}", e);
                    }
                    return Err(RunnerError::Timeout {
                        command: command.to_string(),
                        seconds: run_config.timeout_seconds,
                    });
                }
                _ = self.interrupts.notify.notified(), if self.options.tolerate_interrupts => {
                    warn!("Interrupt received, waiting for the running command to exit");
                }
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec, run_config: &RunConfig) -> RunnerResult<ExecutionResult> {
        let command = spec.to_string();
        self.listen_for_interrupts()?;
        if self.interrupted() {
            return Err(RunnerError::Interrupted(command));
        }
        debug!("Executing: {}", command);

        let mut child = self
            .build_command(spec, run_config)
            .spawn()
            .map_err(|source| RunnerError::SpawnFailed {
                program: spec.program.clone(),
                source,
            })?;

        let started_at = Utc::now();
        let status = self.wait_for(&mut child, &command, run_config).await?;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        if self.interrupted() {
            warn!("Interrupted, not continuing after: {}", command);
            return Err(RunnerError::Interrupted(command));
        }

        let exit_code = status
            .code()
            .ok_or_else(|| RunnerError::Terminated(command.clone()))?;

        if self.options.ci_mode {
            info!(
                "[{}] exit {} after {}ms: {}",
                finished_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                exit_code,
                duration_ms,
                command
            );
        } else {
            debug!("Exit code {} after {}ms", exit_code, duration_ms);
        }

        Ok(ExecutionResult {
            command,
            exit_code,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
