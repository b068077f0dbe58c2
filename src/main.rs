use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use version_finder::cancel::CancellationToken;
use version_finder::config::{self, FinderConfig};
use version_finder::feed::nuget_v3::NuGetV3FeedClient;
use version_finder::logging::{self, LogTarget};
use version_finder::version::finder;
use version_finder::version::nuget::Version;
use version_finder::version::requirement::Requirement;
use version_finder::version::types::DependencyInfo;
use version_finder::version::vulnerability::SecurityVulnerability;

#[derive(Parser)]
#[command(name = "version-finder")]
#[command(version, about = "Find eligible upgrade versions of a NuGet package")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write logs to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List eligible upgrade versions per source as JSON
    Find {
        package: String,
        /// Current version constraint, e.g. "[1.0.0, )" or "1.*"
        constraint: String,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Never upgrade to versions matching this requirement, e.g. ">= 3.0"
        #[arg(long = "ignore", value_name = "REQ")]
        ignored: Vec<Requirement>,
        /// Treat versions matching this requirement as vulnerable
        #[arg(long = "vulnerable", value_name = "REQ")]
        vulnerable: Vec<Requirement>,
    },
    /// Check whether any source lists an exact version
    Exists {
        package: String,
        version: Version,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = config::log_path();
    let target = if cli.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File(&log_path)
    };
    let _guard = logging::init(target)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    let cancellation = CancellationToken::new();
    let token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling resolution");
            token.cancel();
        }
    });

    match command {
        Command::Find {
            package,
            constraint,
            config,
            ignored,
            vulnerable,
        } => {
            let config = load_config(config.as_deref())?;
            let client = NuGetV3FeedClient::new(&config.http)?;

            let mut dependency =
                DependencyInfo::new(&package, &constraint).with_ignored_versions(ignored);
            if !vulnerable.is_empty() {
                dependency = dependency.with_vulnerabilities(vec![SecurityVulnerability {
                    dependency_name: package.clone(),
                    vulnerable_versions: vulnerable,
                    safe_versions: Vec::new(),
                }]);
            }

            let result = finder::get_versions(
                &dependency,
                &config.package_sources,
                &config.package_source_mapping,
                &client,
                &cancellation,
            )
            .await
            .inspect_err(|e| error!("Failed to find versions of {}: {}", package, e))?;

            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Exists {
            package,
            version,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let client = NuGetV3FeedClient::new(&config.http)?;

            let exists = finder::version_exists(
                &package,
                &version,
                &config.package_sources,
                &config.package_source_mapping,
                &client,
                &cancellation,
            )
            .await
            .with_context(|| format!("Failed to check {} {}", package, version))?;

            println!("{}", exists);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FinderConfig> {
    let config = match path {
        Some(path) => FinderConfig::load(path)?,
        None => FinderConfig::default(),
    };
    debug!(
        "Loaded {} package source(s), source mapping {}",
        config.package_sources.len(),
        if config.package_source_mapping.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    Ok(config)
}
