//! Core types for the node ACL
//!
//! Defines the permission roles, the per-role permitted address set,
//! and the address normalization shared by the load and query paths.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a `0x`-prefixed 20-byte hex address string
pub const ADDRESS_STRING_LEN: usize = 42;

/// Capacity in which an address is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May send transactions
    Sender,
    /// May receive transactions
    Recipient,
    /// May deploy contracts
    Creator,
}

impl Role {
    /// All roles, in refresh order
    pub const ALL: [Role; 3] = [Role::Sender, Role::Recipient, Role::Creator];

    /// Human-readable name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Role::Sender => "Sender",
            Role::Recipient => "Recipient",
            Role::Creator => "Creator",
        }
    }

    /// Allow-list filename for this role inside the ACL directory
    pub fn filename(&self) -> &'static str {
        match self {
            Role::Sender => "allowed_from.txt",
            Role::Recipient => "allowed_to.txt",
            Role::Creator => "allowed_smart_deploy.txt",
        }
    }

    /// Slot index into per-role storage
    pub(crate) fn index(&self) -> usize {
        match self {
            Role::Sender => 0,
            Role::Recipient => 1,
            Role::Creator => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sender" | "from" => Ok(Role::Sender),
            "recipient" | "to" => Ok(Role::Recipient),
            "creator" | "deploy" => Ok(Role::Creator),
            other => Err(format!(
                "unknown role '{}' (expected sender, recipient or creator)",
                other
            )),
        }
    }
}

/// Sorted, normalized addresses permitted for one role.
///
/// An empty set means the role is unrestricted: every address is permitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermittedSet {
    addrs: Vec<String>,
}

impl PermittedSet {
    /// Build from already-normalized address strings. Sorts them so that
    /// two sets with the same contents compare equal regardless of file order.
    pub fn from_addrs(mut addrs: Vec<String>) -> Self {
        addrs.sort();
        Self { addrs }
    }

    /// Empty set (unrestricted)
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// No addresses listed, so every address is permitted
    pub fn is_unrestricted(&self) -> bool {
        self.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Exact match against a normalized address string
    pub fn contains(&self, addr: &str) -> bool {
        self.addrs.binary_search_by(|a| a.as_str().cmp(addr)).is_ok()
    }

    pub fn addrs(&self) -> &[String] {
        &self.addrs
    }
}

/// Lowercase `0x` hex form of an address, as compared against the lists.
pub fn normalize_address(address: &Address) -> String {
    format!("{:?}", address).to_lowercase()
}

/// Normalize a raw allow-list line. Lists are matched case-insensitively,
/// so checksummed (mixed-case) entries match the lowercase query form.
pub fn normalize_line(line: &str) -> String {
    line.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_and_files() {
        assert_eq!(Role::Sender.name(), "Sender");
        assert_eq!(Role::Recipient.to_string(), "Recipient");
        assert_eq!(Role::Creator.filename(), "allowed_smart_deploy.txt");
        assert_eq!(Role::Sender.filename(), "allowed_from.txt");
        assert_eq!(Role::Recipient.filename(), "allowed_to.txt");
    }

    #[test]
    fn test_role_slots_are_distinct() {
        let idx: Vec<usize> = Role::ALL.iter().map(|r| r.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("sender".parse::<Role>().unwrap(), Role::Sender);
        assert_eq!("TO".parse::<Role>().unwrap(), Role::Recipient);
        assert_eq!(" deploy ".parse::<Role>().unwrap(), Role::Creator);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_permitted_set_order_insensitive() {
        let a = PermittedSet::from_addrs(vec!["0xbb".into(), "0xaa".into()]);
        let b = PermittedSet::from_addrs(vec!["0xaa".into(), "0xbb".into()]);
        assert_eq!(a, b);
        assert!(a.contains("0xaa"));
        assert!(!a.contains("0xcc"));
    }

    #[test]
    fn test_permitted_set_length_mismatch() {
        let a = PermittedSet::from_addrs(vec!["0xaa".into()]);
        let b = PermittedSet::from_addrs(vec!["0xaa".into(), "0xaa".into()]);
        assert_ne!(a, b);
        assert!(b.contains("0xaa"));
    }

    #[test]
    fn test_unrestricted_means_empty() {
        assert!(PermittedSet::unrestricted().is_unrestricted());
        assert!(PermittedSet::from_addrs(Vec::new()).is_unrestricted());

        let set = PermittedSet::from_addrs(vec!["0xaa".into()]);
        assert!(!set.is_unrestricted());
        assert_eq!(set.is_unrestricted(), set.is_empty());
    }

    #[test]
    fn test_normalize_address_lowercase() {
        let addr: Address = "0x45DDA9CB7C25131DF268515131F647D726F50608".parse().unwrap();
        let s = normalize_address(&addr);
        assert_eq!(s, "0x45dda9cb7c25131df268515131f647d726f50608");
        assert_eq!(s.len(), ADDRESS_STRING_LEN);
    }
}
