//! Command entry points wiring configuration, services and the pipeline.

mod config;
mod services;

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::install::{Download, InstallOptions, InstallSpec, Installation};
use crate::pipeline::Pipeline;
use crate::runtime::Runtime;
use crate::ui::CancelFlag;

pub use config::{Config, Mode, Overrides};
pub use services::{Services, build_http_client};

/// Fetches the binary for `spec` into the destination (current directory by
/// default).
#[tracing::instrument(skip(runtime, overrides))]
pub async fn download<R: Runtime>(runtime: R, spec: &str, overrides: Overrides) -> Result<()> {
    run(runtime, spec, Mode::Download, overrides).await
}

/// Fetches the binary for `spec` into a bin directory.
#[tracing::instrument(skip(runtime, overrides))]
pub async fn install<R: Runtime>(runtime: R, spec: &str, overrides: Overrides) -> Result<()> {
    run(runtime, spec, Mode::Install, overrides).await
}

async fn run<R: Runtime>(runtime: R, spec: &str, mode: Mode, overrides: Overrides) -> Result<()> {
    let spec = spec.parse::<InstallSpec>()?;
    let config = Config::load(&runtime, mode, overrides)?;
    debug!("Loaded config: {:?}", ConfigSummary(&config));

    let cancel = CancelFlag::new();
    let services = Services::from_config(&config, runtime.is_terminal(), cancel.clone())?;
    let ui = services.ui.clone();

    let download = Download {
        installation: Installation::new(
            spec,
            InstallOptions {
                platform: config.platform,
                site: config.api_url.clone(),
                multiple_binaries: config.multiple_binaries,
                verify_in_archive: config.verify_in_archive,
            },
        ),
        destination: config.destination.clone(),
    };
    let pipeline = Pipeline::new(
        runtime,
        services.source,
        services.http,
        services.ui,
        services.cache,
    );

    // First Ctrl-C fails the running transfer; a second one exits at once.
    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping...");
            cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130); // Standard exit code for Ctrl-C
            }
        }
    });

    let result = pipeline.run(&download).await;

    ctrl_c_handler.abort();

    let installed: Vec<PathBuf> = result?;
    for path in installed {
        ui.println(&format!("✨ Installed {}", path.display()));
    }
    Ok(())
}

// Keeps the token out of debug logs.
struct ConfigSummary<'a>(&'a Config);

impl std::fmt::Debug for ConfigSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = self.0;
        f.debug_struct("Config")
            .field("token", &c.token.as_ref().map(|_| "***"))
            .field("api_url", &c.api_url)
            .field("cache_dir", &c.cache_dir)
            .field("destination", &c.destination)
            .field("platform", &c.platform)
            .finish()
    }
}
