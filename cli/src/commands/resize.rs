//! `vmctl resize` and `vmctl grow-disk` — change a VM's allocation.

use anyhow::Result;
use clap::Args;
use vmctl_common::{UpdateCpuRam, UpdateStorage};

use crate::app::AppContext;
use crate::output::progress;

/// Arguments for the resize command.
#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// VM name
    pub name: String,
    /// New number of virtual CPUs
    #[arg(long = "cpus")]
    pub num_cpu: u32,
    /// New memory size in GB
    #[arg(long)]
    pub ram_gb: u32,
}

/// Arguments for the grow-disk command.
#[derive(Args, Debug)]
pub struct GrowDiskArgs {
    /// VM name
    pub name: String,
    /// New disk size in GB; must exceed the current size
    #[arg(long)]
    pub storage_gb: u32,
}

/// Run `vmctl resize`. The VM must be powered off.
///
/// # Errors
///
/// Returns the lifecycle error, e.g. `CANNOT_UPDATE` or
/// `INSUFFICIENT_RESOURCES`.
pub async fn run_compute(app: &AppContext, args: ResizeArgs) -> Result<()> {
    let request = UpdateCpuRam {
        name: args.name,
        num_cpu: args.num_cpu,
        ram_gb: args.ram_gb,
    };
    let record = progress::with_spinner(
        app.show_progress(),
        &format!("Resizing {}...", request.name),
        &format!("{} resized", request.name),
        app.service.resize_compute(&app.owner, &request),
    )
    .await?;
    app.renderer()
        .render_vm(&format!("VM {} resized", record.name), &record.to_view())
}

/// Run `vmctl grow-disk`.
///
/// # Errors
///
/// Returns the lifecycle error, e.g. `CANNOT_UPDATE_STORAGE`.
pub async fn run_storage(app: &AppContext, args: GrowDiskArgs) -> Result<()> {
    let request = UpdateStorage {
        name: args.name,
        storage: args.storage_gb,
    };
    let record = progress::with_spinner(
        app.show_progress(),
        &format!("Growing disk of {}...", request.name),
        &format!("{} disk is {} GB", request.name, request.storage),
        app.service.resize_storage(&app.owner, &request),
    )
    .await?;
    app.renderer().render_vm(
        &format!("VM {} disk grown to {} GB", record.name, record.storage_gb),
        &record.to_view(),
    )
}
