//! Application context — unified state passed to every command handler.
//!
//! `AppContext` is built once from the top-level flags and the loaded config,
//! and owns the wired-up `LifecycleService`.

use std::io::IsTerminal;

use anyhow::Result;
use vmctl_common::OwnerId;

use crate::application::LifecycleService;
use crate::domain::VmctlConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::gateway::ScriptGateway;
use crate::infra::store::JsonVmStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

/// Production wiring of the lifecycle service.
pub type VmService = LifecycleService<ScriptGateway<TokioCommandRunner>, JsonVmStore>;

/// Owner used when neither `--owner` nor `VMCTL_OWNER` nor `USER` is set.
const FALLBACK_OWNER: &str = "default";

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by the `CI` env var).
    pub yes: bool,
    /// Principal the commands act for (`--owner` / `VMCTL_OWNER`).
    pub owner: Option<String>,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where the config was read from.
    pub config_store: YamlConfigStore,
    /// Effective configuration, env overrides applied.
    pub config: VmctlConfig,
    /// Lifecycle operations over the script gateway and JSON store.
    pub service: VmService,
    /// Calling principal.
    pub owner: OwnerId,
    /// `--yes` was given: every confirmation is answered yes.
    pub assume_yes: bool,
    /// No one can answer a prompt (CI, or stdin is not a terminal).
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or the
    /// home directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let non_interactive = std::env::var("CI").is_ok() || !std::io::stdin().is_terminal();

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        let config_store = YamlConfigStore::from_env()?;
        let config = config_store.load()?;
        let store = match &config.store.dir {
            Some(dir) => JsonVmStore::with_dir(dir.clone()),
            None => JsonVmStore::new()?,
        };
        let gateway = ScriptGateway::from_config(config.hypervisor.clone());

        Ok(Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            mode,
            config_store,
            config,
            service: LifecycleService::new(gateway, store),
            owner: resolve_owner(flags.behaviour.owner.clone(), std::env::var("USER").ok()),
            assume_yes: flags.behaviour.yes,
            non_interactive,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Whether a spinner may be drawn while a command runs.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        !self.is_json() && self.output.show_progress()
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Ask the user for confirmation.
    ///
    /// `--yes` answers without prompting. Without it, a session that cannot
    /// prompt is refused rather than given the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is non-interactive and `--yes` was not
    /// given, or the terminal prompt fails.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if let Some(answer) = preset_answer(prompt, self.assume_yes, self.non_interactive)? {
            return Ok(answer);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}

/// Answer a prompt without asking, when the flags decide it.
///
/// `Ok(None)` means the user has to be asked.
fn preset_answer(prompt: &str, assume_yes: bool, non_interactive: bool) -> Result<Option<bool>> {
    if assume_yes {
        return Ok(Some(true));
    }
    anyhow::ensure!(
        !non_interactive,
        "{prompt}: confirmation required (re-run with --yes)"
    );
    Ok(None)
}

/// Pick the calling principal: explicit flag, then login name.
#[must_use]
pub fn resolve_owner(flag: Option<String>, login: Option<String>) -> OwnerId {
    flag.into_iter()
        .chain(login)
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .map_or_else(|| OwnerId::new(FALLBACK_OWNER), OwnerId::new)
}
