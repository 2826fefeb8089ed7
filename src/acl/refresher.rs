//! ACL Refresher
//!
//! Background task that re-reads the three allow-list files on a fixed
//! interval and swaps in any role list whose contents changed.
//!
//! Loop design:
//!     - One task, so cycles never overlap
//!     - Wakes on: stop signal (checked first), interval tick, forced refresh
//!     - A cycle runs on the blocking pool and is awaited; a stop requested mid-cycle
//!       is seen before the next tick
//!     - Missed ticks are delayed rather than bursted
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use super::parser;
use super::state::AclState;
use crate::types::Role;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Run one refresh cycle over all roles. Returns how many role lists changed.
pub fn refresh_cycle(state: &AclState, dir: &Path) -> usize {
    let mut changed = 0;

    for role in Role::ALL {
        let fresh = parser::load(dir, role.filename());
        if state.replace_if_changed(role, fresh) {
            debug!(
                "Refresh addresses from: {}, values: {:?}",
                role.filename(),
                state.snapshot(role).addrs()
            );
            changed += 1;
        }
    }

    state.record_cycle();
    changed
}

/// Run one cycle on tokio's blocking pool so slow filesystems never stall
/// a runtime worker.
pub(crate) async fn run_cycle(state: &Arc<AclState>, dir: &Path) -> usize {
    let state = Arc::clone(state);
    let dir = dir.to_path_buf();

    match tokio::task::spawn_blocking(move || refresh_cycle(&state, &dir)).await {
        Ok(changed) => changed,
        Err(e) => {
            warn!("ACL refresh cycle failed: {}", e);
            0
        }
    }
}

/// Refresher loop. Exits once `stop_rx` observes a stop (or its sender is dropped).
pub(crate) async fn run(
    state: Arc<AclState>,
    dir: PathBuf,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
    force: Arc<Notify>,
) {
    info!("ACL watcher started: {} (every {:?})", dir.display(), interval);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *stop_rx.borrow() {
            break;
        }

        tokio::select! {
            biased;

            _ = stop_rx.changed() => {
                // Only ever set to true, and a dropped sender also means stop
                break;
            }
            _ = ticker.tick() => {}
            _ = force.notified() => {
                debug!("ACL refresh forced");
            }
        }

        let changed = run_cycle(&state, &dir).await;
        if changed > 0 {
            info!("ACL refresh: {} role list(s) updated", changed);
        }
    }

    info!("ACL watcher stopped: {}", dir.display());
}
