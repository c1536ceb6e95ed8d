// Provisioner binary entry point: the image-build step that downloads the
// cron scheduler binary, verifies its pinned checksum, and installs it.

use anyhow::Result;
use common::bootstrap;
use common::provision::Provisioner;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = bootstrap::load_provision_settings()?;
    bootstrap::init_tracing(&settings.observability, "provisioner=info,common=info");

    info!(
        url = %settings.download.url,
        install_path = %settings.install.path,
        "Starting scheduler binary provisioning"
    );

    let provisioner = Provisioner::new(settings);
    if let Err(e) = provisioner.run().await {
        // A checksum mismatch or download failure must fail the image build.
        error!(error = %e, "Provisioning failed");
        return Err(e.into());
    }

    info!("Provisioning complete");
    Ok(())
}
