// Launcher engine implementation

use crate::config::Settings;
use crate::crontab::{write_crontab, CrontabEntry};
use crate::errors::{LauncherError, ScheduleError};
use crate::schedule;
use crate::supervisor::JobScheduler;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use tracing::{info, instrument};

/// Main launcher engine.
///
/// Two states: before `start` completes writing the crontab the engine is
/// still starting up and every failure aborts the process; once the scheduler
/// process is running the engine blocks inside it until exit. The only way
/// back is a full process restart; there is no internal restart logic, the
/// surrounding container runtime owns recovery.
pub struct LauncherEngine {
    settings: Settings,
    scheduler: Arc<dyn JobScheduler>,
}

impl LauncherEngine {
    pub fn new(settings: Settings, scheduler: Arc<dyn JobScheduler>) -> Self {
        Self {
            settings,
            scheduler,
        }
    }

    /// Run the startup sequence and hand off to the scheduler process.
    ///
    /// Validates the schedule expression, writes the crontab file
    /// (truncating prior content), then blocks in the scheduler until it
    /// exits, returning its exit status.
    #[instrument(skip(self), fields(schedule = %self.settings.schedule.expression))]
    pub async fn start(&self) -> Result<ExitStatus, LauncherError> {
        let expression = self.settings.schedule.expression.trim();
        if expression.is_empty() {
            return Err(ScheduleError::MissingExpression.into());
        }

        schedule::validate_expression(expression)?;
        let next = schedule::next_occurrence(expression)?;

        info!(
            schedule = %expression,
            job = %self.settings.job.script_path,
            next_run = %next,
            "Starting cron schedule"
        );

        let entry = CrontabEntry::new(expression, self.settings.job.script_path.clone());
        let crontab_path = PathBuf::from(&self.settings.crontab.path);
        write_crontab(&crontab_path, &entry).await?;

        let status = self.scheduler.run(&crontab_path).await?;
        Ok(status)
    }
}
