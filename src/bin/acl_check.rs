//! ACL Check
//!
//! One-shot permission check: loads the allow-lists once and reports whether
//! an address is permitted for a role. Exit code 0 = permitted, 1 = denied.
//!
//! Usage:
//!   cargo run --bin acl-check -- --acl-dir /var/lib/node/acl --role sender 0x45dd...
//!   cargo run --bin acl-check -- --datadir /var/lib/node --role deploy 0x45dd... --json
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use node_acl::{Acl, AclConfig, Role};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "acl-check")]
struct Args {
    /// Directory holding the allow-list files
    #[arg(long, conflicts_with = "datadir", required_unless_present = "datadir")]
    acl_dir: Option<PathBuf>,

    /// Node data directory (lists are read from <datadir>/acl)
    #[arg(long)]
    datadir: Option<PathBuf>,

    /// Role to check: sender|from, recipient|to, creator|deploy
    #[arg(short, long)]
    role: Role,

    /// Address to check (0x-prefixed hex)
    address: String,

    /// Print the decision as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Decision {
    address: String,
    role: Role,
    permitted: bool,
    unrestricted: bool,
    list_size: usize,
    acl_dir: String,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match (&args.acl_dir, &args.datadir) {
        (Some(dir), _) => AclConfig::new(dir),
        (None, Some(datadir)) => AclConfig::from_datadir(datadir),
        (None, None) => anyhow::bail!("--acl-dir or --datadir is required"),
    };

    let address: Address = args
        .address
        .parse()
        .with_context(|| format!("Invalid address: {}", args.address))?;

    let acl = Acl::new(config);
    acl.refresh_once()?;

    let list = acl.snapshot(args.role);
    let decision = Decision {
        address: node_acl::types::normalize_address(&address),
        role: args.role,
        permitted: acl.is_permitted(args.role, &address),
        unrestricted: list.is_unrestricted(),
        list_size: list.len(),
        acl_dir: acl.config().acl_dir.display().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else if decision.unrestricted {
        println!(
            "{} is PERMITTED as {} ({} list empty or missing: unrestricted)",
            decision.address, decision.role, args.role.filename()
        );
    } else {
        println!(
            "{} is {} as {} ({} entries in {})",
            decision.address,
            if decision.permitted { "PERMITTED" } else { "DENIED" },
            decision.role,
            decision.list_size,
            args.role.filename()
        );
    }

    if !decision.permitted {
        std::process::exit(1);
    }
    Ok(())
}
