// Scheduler binary provisioning for the image build step
//
// Downloads the pinned scheduler release artifact, verifies its SHA-256
// checksum, and only then installs it at the executable path. The artifact is
// staged next to the install path and renamed into place after verification,
// so a failed or corrupted download never leaves a trusted-looking binary
// behind.

use crate::config::ProvisionSettings;
use crate::errors::ProvisionError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Suffix of the staging file written during download.
const STAGING_SUFFIX: &str = ".download";

pub struct Provisioner {
    settings: ProvisionSettings,
}

impl Provisioner {
    pub fn new(settings: ProvisionSettings) -> Self {
        Self { settings }
    }

    /// Download, verify, and install the scheduler binary.
    ///
    /// Strict first-failure abort: any error leaves the install path
    /// untouched and removes the staging file.
    #[instrument(skip(self), fields(url = %self.settings.download.url))]
    pub async fn run(&self) -> Result<(), ProvisionError> {
        let install_path = PathBuf::from(&self.settings.install.path);
        let staging_path = staging_path_for(&install_path);

        info!(
            staging = %staging_path.display(),
            "Downloading scheduler binary"
        );

        let result = self.download_and_verify(&staging_path).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&staging_path).await;
            return result;
        }

        install(&staging_path, &install_path).await?;

        info!(
            path = %install_path.display(),
            sha256 = %self.settings.download.sha256,
            "Scheduler binary installed"
        );
        Ok(())
    }

    /// Stream the artifact to the staging file, hashing while writing, and
    /// compare the digest against the pinned value.
    async fn download_and_verify(&self, staging_path: &Path) -> Result<(), ProvisionError> {
        let url = &self.settings.download.url;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.settings.download.timeout_seconds))
            .build()
            .map_err(|e| ProvisionError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let mut response =
            client
                .get(url.as_str())
                .send()
                .await
                .map_err(|e| ProvisionError::Download {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            return Err(ProvisionError::HttpStatus {
                url: url.clone(),
                status: response.status().as_u16(),
            });
        }

        let mut file =
            tokio::fs::File::create(staging_path)
                .await
                .map_err(|e| ProvisionError::Stage {
                    path: staging_path.display().to_string(),
                    source: e,
                })?;

        let mut hasher = Sha256::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| ProvisionError::Download {
            url: url.clone(),
            reason: e.to_string(),
        })? {
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| ProvisionError::Stage {
                    path: staging_path.display().to_string(),
                    source: e,
                })?;
        }

        file.flush().await.map_err(|e| ProvisionError::Stage {
            path: staging_path.display().to_string(),
            source: e,
        })?;
        drop(file);

        let actual = hex::encode(hasher.finalize());
        let expected = self.settings.download.sha256.to_ascii_lowercase();
        if actual != expected {
            return Err(ProvisionError::ChecksumMismatch {
                url: url.clone(),
                expected,
                actual,
            });
        }

        Ok(())
    }
}

fn staging_path_for(install_path: &Path) -> PathBuf {
    let mut name = install_path.as_os_str().to_os_string();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// Mark the verified staging file executable and rename it into place.
async fn install(staging_path: &Path, install_path: &Path) -> Result<(), ProvisionError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(staging_path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| ProvisionError::Install {
                path: install_path.display().to_string(),
                source: e,
            })?;
    }

    tokio::fs::rename(staging_path, install_path)
        .await
        .map_err(|e| ProvisionError::Install {
            path: install_path.display().to_string(),
            source: e,
        })
}

/// Compute the SHA-256 of a file as lowercase hex.
pub async fn sha256_file(path: &Path) -> Result<String, std::io::Error> {
    let bytes = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
