//! Infrastructure implementation of the `HypervisorGateway` port.
//!
//! `ScriptGateway<R>` turns each `HypervisorCommand` into one invocation of a
//! PowerShell script:
//!
//! ```text
//! <shell> -NoProfile -NonInteractive -File <scripts_dir>/<script> \
//!     <host> <username> <password> <vm-name> [params...]
//! ```
//!
//! and routes it through a `CommandRunner`, so tests can inject a mock runner
//! without spawning real processes.

use std::process::Output;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::application::ports::{CommandRunner, HypervisorGateway};
use crate::domain::{GatewayError, HypervisorCommand, HypervisorConfig};
use crate::infra::command_runner::TokioCommandRunner;

/// Script file run for each command.
#[must_use]
pub fn script_for(command: &HypervisorCommand) -> &'static str {
    match command {
        HypervisorCommand::Create { .. } => "create_VM.ps1",
        HypervisorCommand::Delete { .. } => "delete_VM.ps1",
        HypervisorCommand::Start { .. } => "start_VM.ps1",
        HypervisorCommand::Stop { .. } => "stop_VM.ps1",
        HypervisorCommand::Suspend { .. } => "suspend_VM.ps1",
        HypervisorCommand::ResizeStorage { .. } => "update_hard_disk_VM.ps1",
        HypervisorCommand::ResizeCompute { .. } => "update_CPU_RAM_VM.ps1",
        HypervisorCommand::FetchAddress { .. } => "get_ip_VM.ps1",
    }
}

/// Gateway that runs one hypervisor script per command.
pub struct ScriptGateway<R: CommandRunner> {
    runner: R,
    config: HypervisorConfig,
}

impl<R: CommandRunner> ScriptGateway<R> {
    pub fn new(runner: R, config: HypervisorConfig) -> Self {
        Self { runner, config }
    }

    /// Full argument list for `command`, credentials included.
    fn args(&self, command: &HypervisorCommand) -> Vec<String> {
        let script = self.config.scripts_dir.join(script_for(command));
        let mut args = vec![
            "-NoProfile".to_string(),
            "-NonInteractive".to_string(),
            "-File".to_string(),
            script.to_string_lossy().into_owned(),
            self.config.host.clone(),
            self.config.username.clone(),
            self.config.password.clone(),
            command.vm_name().to_string(),
        ];
        args.extend(command.params());
        args
    }
}

impl ScriptGateway<TokioCommandRunner> {
    /// Production gateway bounded by the configured timeout.
    #[must_use]
    pub fn from_config(config: HypervisorConfig) -> Self {
        let runner = TokioCommandRunner::new(config.timeout());
        Self::new(runner, config)
    }
}

impl<R: CommandRunner> HypervisorGateway for ScriptGateway<R> {
    async fn run(&self, command: &HypervisorCommand) -> Result<String, GatewayError> {
        let script = script_for(command);
        self.config
            .validate()
            .map_err(|e| GatewayError::Invocation {
                script: script.to_string(),
                reason: e.to_string(),
            })?;

        let args = self.args(command);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let session = GatewaySession::open(command.operation(), command.vm_name(), script);
        let output = session
            .execute(
                &self.runner,
                &self.config.shell,
                &arg_refs,
                self.config.timeout(),
            )
            .await
            .map_err(|e| GatewayError::Invocation {
                script: script.to_string(),
                reason: format!("{e:#}"),
            })?;

        if !output.status.success() {
            return Err(GatewayError::Failed {
                script: script.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(strip_trailing_newlines(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}

fn strip_trailing_newlines(text: &str) -> String {
    text.trim_end_matches(['\r', '\n']).to_string()
}

// ── GatewaySession ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Open,
    Completed,
    Failed,
}

/// Scope of one hypervisor command.
///
/// Opened right before the script runs and consumed by [`Self::execute`], so
/// a session wraps exactly one execution. It is released on every exit path:
/// success, failure, or the caller dropping the future mid-command (the
/// runner then kills the child and the session logs itself as abandoned).
struct GatewaySession<'a> {
    operation: &'static str,
    vm: &'a str,
    script: &'static str,
    opened: Instant,
    end: SessionEnd,
}

impl<'a> GatewaySession<'a> {
    fn open(operation: &'static str, vm: &'a str, script: &'static str) -> Self {
        debug!(vm, operation, script, "gateway session opened");
        Self {
            operation,
            vm,
            script,
            opened: Instant::now(),
            end: SessionEnd::Open,
        }
    }

    async fn execute(
        mut self,
        runner: &impl CommandRunner,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        let result = runner.run_with_timeout(program, args, timeout).await;
        self.end = match &result {
            Ok(output) if output.status.success() => SessionEnd::Completed,
            _ => SessionEnd::Failed,
        };
        result
    }
}

impl Drop for GatewaySession<'_> {
    fn drop(&mut self) {
        let elapsed_ms = u64::try_from(self.opened.elapsed().as_millis()).unwrap_or(u64::MAX);
        if self.end == SessionEnd::Open {
            warn!(
                vm = self.vm,
                operation = self.operation,
                script = self.script,
                elapsed_ms,
                "gateway session abandoned before the command finished"
            );
        } else {
            debug!(
                vm = self.vm,
                operation = self.operation,
                outcome = ?self.end,
                elapsed_ms,
                "gateway session closed"
            );
        }
    }
}
