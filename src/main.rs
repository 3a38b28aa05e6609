//! Charcoal Bundler CLI
//!
//! Provisions a runnable server assembly from a bundle archive, then hands
//! the assembled classpath to the entry-point invoker.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use charcoal_bundler::core::config::{
    BundlerConfig, DEFAULT_BUNDLE_FILE, DEFAULT_CONNECT_TIMEOUT_SECS,
};
use charcoal_bundler::{Bundler, InvokerRegistry};

#[derive(Parser)]
#[command(name = "charcoal-bundler")]
#[command(about = "Server bundler and bootstrap pipeline", version)]
struct Cli {
    /// Target output directory for the provisioned assembly
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,

    /// Entry-point symbol override (default: the bundle's META-INF/main-class;
    /// an empty value assembles without launching)
    #[arg(long)]
    main_class: Option<String>,

    /// Path to the bundle archive
    #[arg(long, default_value = DEFAULT_BUNDLE_FILE)]
    bundle: PathBuf,

    /// HTTP connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    /// Arguments forwarded verbatim to the entry point
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,charcoal_bundler=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = BundlerConfig {
        repo_dir: cli.repo_dir,
        bundle_path: cli.bundle,
        main_class: cli.main_class,
        connect_timeout: Duration::from_secs(cli.connect_timeout_secs),
    };

    let bundler = match Bundler::new(config) {
        Ok(bundler) => bundler,
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    let launch = match bundler.provision(cli.args).await {
        Ok(launch) => launch,
        Err(e) => {
            tracing::error!("Provisioning failed: {}", e);
            tracing::error!("Nothing was launched");
            std::process::exit(1);
        }
    };

    if launch.main_class.trim().is_empty() {
        tracing::info!("Empty main class specified, exiting");
        return;
    }

    if let Err(e) = InvokerRegistry::new().invoke(&launch).await {
        tracing::error!("Launch failed: {}", e);
        std::process::exit(1);
    }
}
