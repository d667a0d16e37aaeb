//! `vmctl config` — inspect configuration.

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::app::AppContext;
use crate::output::JsonRenderer;

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration (password redacted)
    Show,
    /// Print the config file path
    Path,
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn run(app: &AppContext, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Path => show_path(app),
    }
}

fn show_config(app: &AppContext) -> Result<()> {
    let config = app.config.redacted();
    let path = app.config_store.path().display().to_string();
    if app.is_json() {
        return JsonRenderer::print(&serde_json::json!({
            "path": path,
            "config": config,
        }));
    }
    let yaml = serde_yaml::to_string(&config).context("cannot serialize config")?;
    crate::output::HumanRenderer::new(&app.output).render_config(&path, &yaml);
    Ok(())
}

fn show_path(app: &AppContext) -> Result<()> {
    let path = app.config_store.path().display().to_string();
    if app.is_json() {
        return JsonRenderer::print(&serde_json::json!({ "path": path }));
    }
    println!("{path}");
    Ok(())
}
