// Launcher binary entry point: the container entrypoint that writes the
// crontab and runs the cron scheduler in the foreground.

use anyhow::Result;
use common::bootstrap;
use common::launcher::LauncherEngine;
use common::supervisor::SchedulerProcess;
use std::process::ExitStatus;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Settings come first: the tracing subscriber is built from the
    // observability section. A load/validation failure (including a missing
    // schedule expression) aborts here with a non-zero exit.
    let settings = bootstrap::load_settings()?;
    bootstrap::init_tracing(&settings.observability, "launcher=info,common=info");

    info!(
        schedule = %settings.schedule.expression,
        job = %settings.job.script_path,
        "Starting QPipeline job launcher"
    );

    let scheduler = Arc::new(SchedulerProcess::new(&settings.supervisor));
    let engine = LauncherEngine::new(settings, scheduler);

    match engine.start().await {
        Ok(status) => {
            info!(status = %status, "Launcher exiting with scheduler status");
            std::process::exit(exit_code(status));
        }
        Err(e) => {
            error!(error = %e, "Launcher failed");
            Err(e.into())
        }
    }
}

/// Map the scheduler's exit status to the launcher's own exit code.
///
/// Signal deaths follow the shell convention of `128 + signal number`.
fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}
