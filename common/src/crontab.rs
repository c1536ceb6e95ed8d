// Crontab file rendering and writing

use crate::errors::CrontabError;
use std::path::Path;
use tracing::info;

/// A single crontab entry mapping a cron expression to the command it runs.
///
/// The launcher only ever manages one entry: the periodic job script. The
/// rendered file is regenerated in full on every launch, so there is no
/// append mode and no merging with prior content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrontabEntry {
    pub expression: String,
    pub command: String,
}

impl CrontabEntry {
    pub fn new(expression: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            command: command.into(),
        }
    }

    /// Render the entry as one newline-terminated crontab line.
    pub fn render(&self) -> String {
        format!("{} {}\n", self.expression, self.command)
    }
}

/// Write the crontab file, truncating any previous content.
///
/// The file has exactly one writer (the launcher) which finishes before the
/// scheduler process reads it, so a plain truncating write is sufficient.
pub async fn write_crontab(path: &Path, entry: &CrontabEntry) -> Result<(), CrontabError> {
    tokio::fs::write(path, entry.render())
        .await
        .map_err(|e| CrontabError::Write {
            path: path.display().to_string(),
            source: e,
        })?;

    info!(path = %path.display(), "Crontab file written");
    Ok(())
}
