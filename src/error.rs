//! ACL lifecycle errors
//!
//! Only watcher lifecycle misuse is an error. Missing files and malformed
//! lines are absorbed by the parser, and permission checks never fail.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AclError {
    #[error("ACL watcher must be started from within a tokio runtime")]
    NoRuntime,

    #[error("ACL watcher is already running")]
    AlreadyRunning,

    #[error("ACL watcher has been stopped and cannot be restarted")]
    Stopped,
}
