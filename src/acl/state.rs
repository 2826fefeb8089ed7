//! ACL State
//!
//! One snapshot slot per role. Each slot is an `RwLock<Arc<PermittedSet>>`:
//! readers clone the `Arc` and release the lock immediately, the refresher
//! swaps in a whole new `Arc`. A reader therefore sees either the old or the
//! new set, never a mix, and no lock is held across a refresh cycle.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::{PermittedSet, Role};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Snapshot of refresher activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Refresh cycles completed
    pub cycles: u64,
    /// Role lists replaced because their contents changed
    pub changes: u64,
    /// When a role list last changed
    pub last_change: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct AclState {
    slots: [RwLock<Arc<PermittedSet>>; 3],
    cycles: AtomicU64,
    changes: AtomicU64,
    last_change: RwLock<Option<DateTime<Utc>>>,
}

impl AclState {
    /// All roles start unrestricted until the first refresh completes.
    pub fn new() -> Self {
        Self {
            slots: [
                RwLock::new(Arc::new(PermittedSet::unrestricted())),
                RwLock::new(Arc::new(PermittedSet::unrestricted())),
                RwLock::new(Arc::new(PermittedSet::unrestricted())),
            ],
            cycles: AtomicU64::new(0),
            changes: AtomicU64::new(0),
            last_change: RwLock::new(None),
        }
    }

    /// Current snapshot for a role
    pub fn snapshot(&self, role: Role) -> Arc<PermittedSet> {
        let slot = &self.slots[role.index()];
        // A poisoned slot still holds a complete Arc; keep serving it.
        match slot.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the role's set if `fresh` differs from the stored one.
    /// Returns true when a replacement happened.
    pub fn replace_if_changed(&self, role: Role, fresh: PermittedSet) -> bool {
        if *self.snapshot(role) == fresh {
            return false;
        }

        let fresh = Arc::new(fresh);
        {
            let slot = &self.slots[role.index()];
            let mut guard = match slot.write() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = fresh;
        }

        self.changes.fetch_add(1, Ordering::Relaxed);
        match self.last_change.write() {
            Ok(mut g) => *g = Some(Utc::now()),
            Err(poisoned) => *poisoned.into_inner() = Some(Utc::now()),
        }
        true
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> RefreshStats {
        let last_change = match self.last_change.read() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        };
        RefreshStats {
            cycles: self.cycles.load(Ordering::Relaxed),
            changes: self.changes.load(Ordering::Relaxed),
            last_change,
        }
    }
}

impl Default for AclState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(addrs: &[&str]) -> PermittedSet {
        PermittedSet::from_addrs(addrs.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_initially_unrestricted() {
        let state = AclState::new();
        for role in Role::ALL {
            assert!(state.snapshot(role).is_unrestricted());
        }
        assert_eq!(state.stats(), RefreshStats::default());
    }

    #[test]
    fn test_replace_only_on_change() {
        let state = AclState::new();
        assert!(state.replace_if_changed(Role::Sender, set(&["0xbb", "0xaa"])));
        assert!(!state.replace_if_changed(Role::Sender, set(&["0xaa", "0xbb"])));

        let stats = state.stats();
        assert_eq!(stats.changes, 1);
        assert!(stats.last_change.is_some());
    }

    #[test]
    fn test_roles_are_independent() {
        let state = AclState::new();
        state.replace_if_changed(Role::Creator, set(&["0xaa"]));

        assert!(state.snapshot(Role::Sender).is_unrestricted());
        assert!(state.snapshot(Role::Recipient).is_unrestricted());
        assert_eq!(state.snapshot(Role::Creator).len(), 1);
    }

    #[test]
    fn test_old_snapshot_survives_replacement() {
        let state = AclState::new();
        state.replace_if_changed(Role::Sender, set(&["0xaa"]));
        let old = state.snapshot(Role::Sender);

        state.replace_if_changed(Role::Sender, set(&["0xbb", "0xcc"]));

        assert_eq!(old.addrs(), &["0xaa".to_string()]);
        assert_eq!(state.snapshot(Role::Sender).len(), 2);
    }
}
