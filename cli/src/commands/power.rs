//! `vmctl start|stop|suspend <name>` — power transitions.

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::VmArgs;
use crate::output::progress;

/// Power transition requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    Start,
    Stop,
    Suspend,
}

impl PowerAction {
    fn progress(self) -> &'static str {
        match self {
            Self::Start => "Starting",
            Self::Stop => "Stopping",
            Self::Suspend => "Suspending",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Suspend => "suspended",
        }
    }
}

/// Run `vmctl start`, `vmctl stop` or `vmctl suspend`.
///
/// # Errors
///
/// Returns the lifecycle error, e.g. `ALREADY_IN_STATE` or `CANNOT_SUSPEND`.
pub async fn run(app: &AppContext, action: PowerAction, args: &VmArgs) -> Result<()> {
    let name = args.name.as_str();
    let op = async {
        match action {
            PowerAction::Start => app.service.start(&app.owner, name).await,
            PowerAction::Stop => app.service.stop(&app.owner, name).await,
            PowerAction::Suspend => app.service.suspend(&app.owner, name).await,
        }
    };
    let record = progress::with_spinner(
        app.show_progress(),
        &format!("{} {name}...", action.progress()),
        &format!("{name} {}", action.done()),
        op,
    )
    .await?;
    app.renderer()
        .render_vm(&format!("VM {name} {}", action.done()), &record.to_view())
}
