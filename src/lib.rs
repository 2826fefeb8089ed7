//! Node ACL Library
//!
//! Live-reloading allow-lists gating which addresses may send transactions,
//! receive transactions, or deploy contracts. Lists are read from flat files
//! and refreshed in the background without a restart.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

pub mod acl;
pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use acl::{Acl, RefreshStats, WatcherState};
pub use config::AclConfig;
pub use error::AclError;
pub use types::{PermittedSet, Role, ADDRESS_STRING_LEN};
