// Configuration management with layered configuration (file, env)

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Launcher settings populated once at startup and passed to the engine,
/// so tests can inject configuration without touching the real environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub schedule: ScheduleConfig,
    pub job: JobConfig,
    pub crontab: CrontabConfig,
    pub supervisor: SupervisorConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Cron expression for the periodic job. Required; there is no default
    /// schedule, and an empty expression fails validation.
    #[serde(default)]
    pub expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Absolute path of the job script the scheduler invokes.
    pub script_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrontabConfig {
    /// Where the generated crontab file is written. Regenerated on every
    /// launch; nothing persists across restarts.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Path of the cron scheduler binary.
    pub binary_path: String,
    /// Forward job output live to the launcher's own streams.
    #[serde(default = "default_passthrough_logs")]
    pub passthrough_logs: bool,
    /// Seconds to wait between SIGTERM and SIGKILL at shutdown.
    pub shutdown_grace_seconds: u64,
}

fn default_passthrough_logs() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    #[serde(default = "default_json_logs")]
    pub json_logs: bool,
}

fn default_json_logs() -> bool {
    true
}

impl Settings {
    /// Load configuration with layered precedence: defaults → file → env.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific config directory.
    ///
    /// `CRON_SCHEDULE` is the well-known container interface for the
    /// schedule expression and overrides every other source.
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = Settings::default();

        let builder = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("schedule.expression", std::env::var("CRON_SCHEDULE").ok())?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.schedule.expression.trim().is_empty() {
            return Err(
                "Schedule expression must be set (CRON_SCHEDULE or schedule.expression)"
                    .to_string(),
            );
        }

        if self.job.script_path.is_empty() {
            return Err("Job script path cannot be empty".to_string());
        }

        if self.crontab.path.is_empty() {
            return Err("Crontab path cannot be empty".to_string());
        }

        if self.supervisor.binary_path.is_empty() {
            return Err("Scheduler binary path cannot be empty".to_string());
        }
        if self.supervisor.shutdown_grace_seconds == 0 {
            return Err("Supervisor shutdown_grace_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig {
                expression: String::new(),
            },
            job: JobConfig {
                script_path: "/app/cron-qreceive.sh".to_string(),
            },
            crontab: CrontabConfig {
                path: "/tmp/crontab".to_string(),
            },
            supervisor: SupervisorConfig {
                binary_path: "/usr/local/bin/supercronic".to_string(),
                passthrough_logs: true,
                shutdown_grace_seconds: 5,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}

/// Provisioner settings for the image-build step that installs the scheduler
/// binary. Kept separate from `Settings` because the provisioner runs in a
/// different phase with none of the launcher's inputs available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionSettings {
    pub download: DownloadConfig,
    pub install: InstallConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// URL of the scheduler release artifact.
    #[serde(default)]
    pub url: String,
    /// Pinned SHA-256 of the artifact, 64 hex characters.
    #[serde(default)]
    pub sha256: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Executable path the verified binary is installed to.
    pub path: String,
}

impl ProvisionSettings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let defaults = ProvisionSettings::default();

        let builder = Config::builder()
            .add_source(Config::try_from(&defaults)?)
            .add_source(File::from(config_dir.join("provision.toml")).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.download.url.is_empty() {
            return Err("Download URL cannot be empty".to_string());
        }
        if !self.download.url.starts_with("http://") && !self.download.url.starts_with("https://")
        {
            return Err(format!(
                "Download URL must be http(s), got '{}'",
                self.download.url
            ));
        }

        let sha = &self.download.sha256;
        if sha.len() != 64 || !sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("Download sha256 must be 64 hex characters".to_string());
        }

        if self.install.path.is_empty() {
            return Err("Install path cannot be empty".to_string());
        }

        if self.download.timeout_seconds == 0 {
            return Err("Download timeout_seconds must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            download: DownloadConfig {
                url: String::new(),
                sha256: String::new(),
                timeout_seconds: 60,
            },
            install: InstallConfig {
                path: "/usr/local/bin/supercronic".to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}
