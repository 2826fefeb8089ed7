//! ACL Watcher
//!
//! Runs the live-reloading ACL against a directory of allow-list files and
//! logs every change. Useful for validating list edits before rolling them
//! out to nodes.
//!
//! Force an immediate refresh via SIGHUP:
//!   kill -HUP $(pgrep acl-watcher)
//!
//! Usage:
//!   cargo run --bin acl-watcher -- --acl-dir /var/lib/node/acl
//!   cargo run --bin acl-watcher -- --config /etc/node/acl.toml
//!   cargo run --bin acl-watcher -- --datadir /var/lib/node
//!   ACL_DIR=/var/lib/node/acl cargo run --bin acl-watcher
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use node_acl::{Acl, AclConfig, Role};
use signal_hook::consts::SIGHUP;
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Live-reloading ACL watcher
#[derive(Parser)]
#[command(name = "acl-watcher")]
struct Args {
    /// TOML config file with an [acl] table
    #[arg(short, long, conflicts_with_all = ["datadir", "acl_dir"])]
    config: Option<PathBuf>,

    /// Node data directory (lists are read from <datadir>/acl)
    #[arg(long, conflicts_with = "acl_dir")]
    datadir: Option<PathBuf>,

    /// Directory holding the allow-list files
    #[arg(long)]
    acl_dir: Option<PathBuf>,

    /// Refresh interval in milliseconds (overrides config)
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Seconds between stats reports
    #[arg(long, default_value_t = 300)]
    stats_interval_secs: u64,
}

impl Args {
    fn acl_config(&self) -> Result<AclConfig> {
        let mut config = if let Some(path) = &self.config {
            AclConfig::load(path)?
        } else if let Some(datadir) = &self.datadir {
            AclConfig::from_datadir(datadir)
        } else if let Some(dir) = &self.acl_dir {
            AclConfig::new(dir)
        } else {
            AclConfig::from_env().context("No ACL directory given (use --acl-dir, --datadir, --config or ACL_DIR)")?
        };

        if let Some(ms) = self.interval_ms {
            config.refresh_interval_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.acl_config()?;

    info!("===========================================");
    info!("   Node ACL Watcher");
    info!("===========================================");
    info!("ACL directory: {}", config.acl_dir.display());
    info!("Refresh interval: {:?}", config.refresh_interval());
    for role in Role::ALL {
        info!("  {} <- {}", role, role.filename());
    }

    let acl = Arc::new(Acl::spawn(config)?);

    // SIGHUP forces a refresh without waiting for the next tick
    let mut signals = Signals::new([SIGHUP])?;
    let signals_handle = signals.handle();
    let acl_for_signals = Arc::clone(&acl);
    let signal_task = tokio::spawn(async move {
        while let Some(sig) = signals.next().await {
            if sig == SIGHUP {
                info!("Received SIGHUP - forcing ACL refresh");
                acl_for_signals.refresh_now();
            }
        }
    });

    let mut stats_interval = tokio::time::interval(Duration::from_secs(args.stats_interval_secs.max(1)));
    stats_interval.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
            _ = stats_interval.tick() => {
                let stats = acl.stats();
                let lists: Vec<String> = Role::ALL
                    .iter()
                    .map(|r| {
                        let set = acl.snapshot(*r);
                        if set.is_unrestricted() {
                            format!("{}=unrestricted", r)
                        } else {
                            format!("{}={}", r, set.len())
                        }
                    })
                    .collect();
                info!(
                    "ACL stats: {} cycles, {} changes, last change {:?} | {}",
                    stats.cycles,
                    stats.changes,
                    stats.last_change,
                    lists.join(", ")
                );
            }
        }
    }

    acl.stop().await;
    signals_handle.close();
    let _ = signal_task.await;

    Ok(())
}
