//! `vmctl create` — create and power on a VM.

use anyhow::Result;
use clap::Args;
use vmctl_common::NewVm;

use crate::app::AppContext;
use crate::output::progress;

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// VM name
    pub name: String,
    /// OS profile (ubuntu, windows)
    #[arg(long)]
    pub os: String,
    /// Number of virtual CPUs
    #[arg(long = "cpus")]
    pub num_cpu: u32,
    /// Memory in GB
    #[arg(long)]
    pub ram_gb: u32,
    /// Disk size in GB
    #[arg(long)]
    pub storage_gb: u32,
}

impl From<CreateArgs> for NewVm {
    fn from(args: CreateArgs) -> Self {
        Self {
            name: args.name,
            os: args.os,
            num_cpu: args.num_cpu,
            ram_gb: args.ram_gb,
            storage: args.storage_gb,
        }
    }
}

/// Run `vmctl create`.
///
/// # Errors
///
/// Returns the lifecycle error if validation, the hypervisor, or the store
/// fails.
pub async fn run(app: &AppContext, args: CreateArgs) -> Result<()> {
    let request = NewVm::from(args);
    let record = progress::with_spinner(
        app.show_progress(),
        &format!("Creating {}...", request.name),
        &format!("{} created", request.name),
        app.service.create(&app.owner, &request),
    )
    .await?;
    app.renderer()
        .render_vm(&format!("VM {} is running", record.name), &record.to_view())
}
