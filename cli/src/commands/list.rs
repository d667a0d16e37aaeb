//! `vmctl list` — the caller's VMs.

use anyhow::Result;

use crate::app::AppContext;

/// Run `vmctl list`.
///
/// # Errors
///
/// Returns an error if the records cannot be read.
pub async fn run(app: &AppContext) -> Result<()> {
    let records = app.service.list_for_owner(&app.owner).await?;
    let views: Vec<_> = records.iter().map(|r| r.to_view()).collect();
    app.renderer().render_vm_list(&views)
}
