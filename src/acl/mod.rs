//! Live-reloading ACL
//!
//! `Acl` owns the per-role snapshots and the background refresher that keeps
//! them in sync with the allow-list files. Permission checks read the current
//! snapshot and never block on, or call into, the refresher.
//!
//! Lifecycle: Unstarted -> Running -> Stopped. Stopped is terminal; queries
//! keep answering from the last snapshot in every state.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod parser;
pub mod refresher;
pub mod state;

pub use refresher::refresh_cycle;
pub use state::{AclState, RefreshStats};

use crate::config::AclConfig;
use crate::error::AclError;
use crate::types::{normalize_address, PermittedSet, Role};
use alloy::primitives::Address;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Externally visible watcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Unstarted,
    Running,
    Stopped,
}

enum Watcher {
    Unstarted,
    Running(JoinHandle<()>),
    Stopped,
}

pub struct Acl {
    config: AclConfig,
    state: Arc<AclState>,
    stop_tx: watch::Sender<bool>,
    force: Arc<Notify>,
    watcher: Mutex<Watcher>,
    /// Set once the refresher task has exited (or will never run)
    exited: Arc<watch::Sender<bool>>,
}

/// Marks the refresher as exited when dropped, including on panic
struct ExitGuard(Arc<watch::Sender<bool>>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

impl Acl {
    /// Create an ACL without starting the watcher. All roles are unrestricted
    /// until the first refresh.
    pub fn new(config: AclConfig) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (exited, _) = watch::channel(false);
        Self {
            config,
            state: Arc::new(AclState::new()),
            stop_tx,
            force: Arc::new(Notify::new()),
            watcher: Mutex::new(Watcher::Unstarted),
            exited: Arc::new(exited),
        }
    }

    /// Create an ACL and start its watcher on the current tokio runtime.
    pub fn spawn(config: AclConfig) -> Result<Self, AclError> {
        let acl = Self::new(config);
        acl.start()?;
        Ok(acl)
    }

    /// Start the background refresher. Only one watcher per ACL.
    pub fn start(&self) -> Result<(), AclError> {
        let mut watcher = self.lock_watcher();
        match *watcher {
            Watcher::Running(_) => return Err(AclError::AlreadyRunning),
            Watcher::Stopped => return Err(AclError::Stopped),
            Watcher::Unstarted => {}
        }

        let runtime = Handle::try_current().map_err(|_| AclError::NoRuntime)?;
        let run = refresher::run(
            Arc::clone(&self.state),
            self.config.acl_dir.clone(),
            self.config.refresh_interval(),
            self.stop_tx.subscribe(),
            Arc::clone(&self.force),
        );
        let guard = ExitGuard(Arc::clone(&self.exited));
        let task = runtime.spawn(async move {
            let _guard = guard;
            run.await;
        });

        *watcher = Watcher::Running(task);
        Ok(())
    }

    /// Stop the watcher and wait for it to exit. Once this returns, no
    /// further list updates happen, for every caller. Idempotent.
    pub async fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lock_watcher(), Watcher::Stopped);
        self.stop_tx.send_replace(true);

        match previous {
            Watcher::Running(task) => {
                if let Err(e) = task.await {
                    warn!("ACL watcher task ended abnormally: {}", e);
                }
                info!("ACL watcher stopped");
            }
            // Never started: nothing will ever write
            Watcher::Unstarted => {
                self.exited.send_replace(true);
            }
            // Another caller is (or was) joining the task
            Watcher::Stopped => {
                let mut exited = self.exited.subscribe();
                let _ = exited.wait_for(|done| *done).await;
            }
        }
    }

    /// Ask the running watcher to refresh now instead of at the next tick.
    pub fn refresh_now(&self) {
        if self.watcher_state() == WatcherState::Running {
            self.force.notify_one();
        } else {
            debug!("ACL refresh requested but watcher is not running");
        }
    }

    /// Run a single refresh cycle on the calling thread. Only valid before
    /// the watcher starts, so the refresher stays the sole writer.
    pub fn refresh_once(&self) -> Result<usize, AclError> {
        let watcher = self.lock_watcher();
        match *watcher {
            Watcher::Unstarted => Ok(refresh_cycle(&self.state, &self.config.acl_dir)),
            Watcher::Running(_) => Err(AclError::AlreadyRunning),
            Watcher::Stopped => Err(AclError::Stopped),
        }
    }

    pub fn watcher_state(&self) -> WatcherState {
        match *self.lock_watcher() {
            Watcher::Unstarted => WatcherState::Unstarted,
            Watcher::Running(_) => WatcherState::Running,
            Watcher::Stopped => WatcherState::Stopped,
        }
    }

    /// Is `address` permitted to act as `role`? An empty list permits everyone.
    pub fn is_permitted(&self, role: Role, address: &Address) -> bool {
        let addr = normalize_address(address);
        let permitted = self.state.snapshot(role);

        let flag = permitted.is_unrestricted() || permitted.contains(&addr);
        debug!("Check is {} permitted for {} - {}", addr, role, flag);
        flag
    }

    pub fn sender_permitted(&self, address: &Address) -> bool {
        self.is_permitted(Role::Sender, address)
    }

    pub fn recipient_permitted(&self, address: &Address) -> bool {
        self.is_permitted(Role::Recipient, address)
    }

    pub fn creator_permitted(&self, address: &Address) -> bool {
        self.is_permitted(Role::Creator, address)
    }

    /// Current list for a role (empty = unrestricted)
    pub fn snapshot(&self, role: Role) -> Arc<PermittedSet> {
        self.state.snapshot(role)
    }

    pub fn stats(&self) -> RefreshStats {
        self.state.stats()
    }

    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    fn lock_watcher(&self) -> MutexGuard<'_, Watcher> {
        self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Acl {
    fn drop(&mut self) {
        // Signal only; the task exits on its own at its next wake-up
        self.stop_tx.send_replace(true);
    }
}
