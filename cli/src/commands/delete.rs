//! `vmctl delete <name>` — destroy a VM and forget its record.

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::VmArgs;
use crate::output::progress;

/// Run `vmctl delete`.
///
/// # Errors
///
/// Returns the lifecycle error, or an error if the prompt cannot be shown.
pub async fn run(app: &AppContext, args: &VmArgs) -> Result<()> {
    let prompt = format!("Delete VM {}? Its disk will be destroyed", args.name);
    if !app.confirm(&prompt, false)? {
        app.output.info("Cancelled.");
        return Ok(());
    }

    let record = progress::with_spinner(
        app.show_progress(),
        &format!("Deleting {}...", args.name),
        &format!("{} deleted", args.name),
        app.service.delete(&app.owner, &args.name),
    )
    .await?;
    app.renderer()
        .render_vm(&format!("VM {} deleted", record.name), &record.to_view())
}
