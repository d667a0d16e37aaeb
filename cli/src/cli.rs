//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands::{self, VmArgs, power::PowerAction};

/// Manage hypervisor VMs: create, power, resize and delete
#[derive(Parser, Debug)]
#[command(
    name = "vmctl",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Act on behalf of this owner (defaults to the login name)
    #[arg(long, global = true, env = "VMCTL_OWNER")]
    pub owner: Option<String>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a VM and power it on
    Create(commands::create::CreateArgs),

    /// Delete a VM and its disk
    Delete(VmArgs),

    /// List your VMs
    List,

    /// Power on a stopped or suspended VM
    Start(VmArgs),

    /// Power off a VM
    Stop(VmArgs),

    /// Suspend a running VM
    Suspend(VmArgs),

    /// Change CPU and memory of a stopped VM
    Resize(commands::resize::ResizeArgs),

    /// Grow the disk of a VM
    GrowDisk(commands::resize::GrowDiskArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

impl Cli {
    /// Flags shared by every command.
    #[must_use]
    pub fn flags(&self) -> AppFlags {
        AppFlags {
            output: OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            behaviour: BehaviourFlags {
                yes: self.yes,
                owner: self.owner.clone(),
            },
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the context cannot be built or the command fails.
    pub async fn run(self) -> Result<()> {
        let app = AppContext::new(&self.flags())?;
        match self.command {
            Command::Create(args) => commands::create::run(&app, args).await,
            Command::Delete(args) => commands::delete::run(&app, &args).await,
            Command::List => commands::list::run(&app).await,
            Command::Start(args) => commands::power::run(&app, PowerAction::Start, &args).await,
            Command::Stop(args) => commands::power::run(&app, PowerAction::Stop, &args).await,
            Command::Suspend(args) => {
                commands::power::run(&app, PowerAction::Suspend, &args).await
            }
            Command::Resize(args) => commands::resize::run_compute(&app, args).await,
            Command::GrowDisk(args) => commands::resize::run_storage(&app, args).await,
            Command::Config(cmd) => commands::config::run(&app, &cmd),
        }
    }
}
