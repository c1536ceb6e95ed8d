// Error handling framework

use thiserror::Error;

/// Schedule-related errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression { expression: String, reason: String },

    #[error("Invalid cron expression '{expression}': expected 5 fields, got {fields}")]
    InvalidFieldCount { expression: String, fields: usize },

    #[error("No schedule expression configured (set CRON_SCHEDULE)")]
    MissingExpression,

    #[error("No upcoming execution time for expression '{0}'")]
    NoNextExecution(String),
}

/// Crontab file errors
#[derive(Error, Debug)]
pub enum CrontabError {
    #[error("Failed to write crontab file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Scheduler process supervision errors
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn scheduler binary {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for scheduler process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("Failed to install signal handler: {0}")]
    SignalSetup(String),
}

/// Scheduler binary provisioning errors
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Download of {url} returned HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Failed to stage download at {path}: {source}")]
    Stage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install binary at {path}: {source}")]
    Install {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level launcher errors aggregating the startup sequence failures
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Crontab(#[from] CrontabError),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}
