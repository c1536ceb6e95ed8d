// Scheduler process supervision
//
// The scheduler binary runs as a managed child process rather than replacing
// the launcher's process image: the launcher owns the child's lifecycle,
// forwards its output streams live, and propagates termination signals to it
// before exiting.

use crate::config::SupervisorConfig;
use crate::errors::SupervisorError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

/// Interface to the foreground scheduler process.
///
/// `run` blocks until the scheduler exits and returns its exit status. Tests
/// substitute a stub binary; the engine only depends on this trait.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn run(&self, crontab_path: &Path) -> Result<ExitStatus, SupervisorError>;
}

/// Supervised invocation of the cron scheduler binary (supercronic).
pub struct SchedulerProcess {
    binary_path: PathBuf,
    passthrough_logs: bool,
    shutdown_grace: Duration,
}

impl SchedulerProcess {
    pub fn new(config: &SupervisorConfig) -> Self {
        Self {
            binary_path: PathBuf::from(&config.binary_path),
            passthrough_logs: config.passthrough_logs,
            shutdown_grace: Duration::from_secs(config.shutdown_grace_seconds),
        }
    }
}

#[async_trait]
impl JobScheduler for SchedulerProcess {
    async fn run(&self, crontab_path: &Path) -> Result<ExitStatus, SupervisorError> {
        let mut cmd = Command::new(&self.binary_path);
        if self.passthrough_logs {
            cmd.arg("-passthrough-logs");
        }
        cmd.arg(crontab_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| SupervisorError::Spawn {
            binary: self.binary_path.display().to_string(),
            source: e,
        })?;

        info!(
            binary = %self.binary_path.display(),
            crontab = %crontab_path.display(),
            pid = child.id(),
            "Scheduler process started"
        );

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_stream(stdout, tokio::io::stdout()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stream(stderr, tokio::io::stderr()));
        }

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = shutdown_signal() => None,
        };

        match waited {
            Some(status) => {
                let status = status.map_err(SupervisorError::Wait)?;
                info!(status = %status, "Scheduler process exited");
                Ok(status)
            }
            None => {
                info!("Shutdown signal received, terminating scheduler process");
                terminate(&mut child, self.shutdown_grace).await
            }
        }
    }
}

/// Forward a child output stream to the launcher's own stream.
///
/// Bytes are copied as read and flushed after every chunk so job output is
/// visible live, unmodified and in order.
pub async fn forward_stream<R, W>(mut reader: R, mut writer: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if writer.write_all(&buf[..n]).await.is_err() {
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading scheduler output stream");
                break;
            }
        }
    }
}

/// Send SIGTERM to the child, wait out the grace period, then force kill.
async fn terminate(child: &mut Child, grace: Duration) -> Result<ExitStatus, SupervisorError> {
    if let Some(pid) = child.id() {
        #[cfg(unix)]
        {
            let _ = std::process::Command::new("kill")
                .args(["-TERM", &pid.to_string()])
                .output();
            info!(pid = pid, "Sent SIGTERM to scheduler process");
        }
        #[cfg(not(unix))]
        {
            let _ = child.start_kill();
        }
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let status = status.map_err(SupervisorError::Wait)?;
            info!(status = %status, "Scheduler process exited after SIGTERM");
            Ok(status)
        }
        Err(_) => {
            warn!(
                grace_seconds = grace.as_secs(),
                "Scheduler did not exit within grace period, force killing"
            );
            child.kill().await.map_err(SupervisorError::Wait)?;
            let status = child.wait().await.map_err(SupervisorError::Wait)?;
            error!(status = %status, "Scheduler process force killed");
            Ok(status)
        }
    }
}

/// Wait for SIGTERM or SIGINT.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(sig) => sig,
            Err(e) => {
                error!(error = %e, "Failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                return;
            }
        };
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_stub(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn process_for(binary: &Path) -> SchedulerProcess {
        SchedulerProcess::new(&SupervisorConfig {
            binary_path: binary.display().to_string(),
            passthrough_logs: false,
            shutdown_grace_seconds: 2,
        })
    }

    #[tokio::test]
    async fn test_forward_stream_preserves_bytes_and_order() {
        let input = b"line one\nline two\nline three\n".to_vec();
        let mut sink = Cursor::new(Vec::new());

        forward_stream(Cursor::new(input.clone()), &mut sink).await;

        assert_eq!(sink.into_inner(), input);
    }

    #[tokio::test]
    async fn test_forward_stream_from_child_process() {
        let mut child = Command::new("/bin/sh")
            .args(["-c", "printf 'a\\nb\\nc\\n'"])
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let stdout = child.stdout.take().unwrap();

        let mut sink = Cursor::new(Vec::new());
        forward_stream(stdout, &mut sink).await;
        child.wait().await.unwrap();

        assert_eq!(sink.into_inner(), b"a\nb\nc\n");
    }

    #[tokio::test]
    async fn test_run_returns_child_exit_status() {
        let dir = TempDir::new().unwrap();
        let stub = write_stub(&dir, "scheduler", "exit 0");
        let crontab = dir.path().join("crontab");
        std::fs::write(&crontab, "0 13 * * * /app/cron-qreceive.sh\n").unwrap();

        let status = process_for(&stub).run(&crontab).await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_run_propagates_nonzero_exit_code() {
        let dir = TempDir::new().unwrap();
        let stub = write_stub(&dir, "scheduler", "exit 3");
        let crontab = dir.path().join("crontab");
        std::fs::write(&crontab, "0 13 * * * /app/cron-qreceive.sh\n").unwrap();

        let status = process_for(&stub).run(&crontab).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_run_with_missing_binary_fails_to_spawn() {
        let dir = TempDir::new().unwrap();
        let crontab = dir.path().join("crontab");
        std::fs::write(&crontab, "0 13 * * * /app/cron-qreceive.sh\n").unwrap();

        let missing = dir.path().join("no-such-binary");
        let err = process_for(&missing).run(&crontab).await.unwrap_err();
        assert!(matches!(err, SupervisorError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_passthrough_flag_is_passed_to_scheduler() {
        let dir = TempDir::new().unwrap();
        // The stub records its arguments; assert the flag and crontab path.
        let args_file = dir.path().join("args");
        let stub = write_stub(
            &dir,
            "scheduler",
            &format!("echo \"$@\" > {}", args_file.display()),
        );
        let crontab = dir.path().join("crontab");
        std::fs::write(&crontab, "0 13 * * * /app/cron-qreceive.sh\n").unwrap();

        let process = SchedulerProcess::new(&SupervisorConfig {
            binary_path: stub.display().to_string(),
            passthrough_logs: true,
            shutdown_grace_seconds: 2,
        });
        process.run(&crontab).await.unwrap();

        let recorded = std::fs::read_to_string(&args_file).unwrap();
        assert_eq!(
            recorded.trim(),
            format!("-passthrough-logs {}", crontab.display())
        );
    }
}
