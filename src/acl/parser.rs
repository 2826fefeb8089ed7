//! Allow-list file parser
//!
//! Reads one allow-list file (one address per line) into a `PermittedSet`.
//! A missing or unreadable file yields the empty (unrestricted) set.
//! Lines that are not exactly `ADDRESS_STRING_LEN` characters are dropped.
//!
//! Author: AI-Generated
//! Created: 2026-02-03

use crate::types::{normalize_line, PermittedSet, ADDRESS_STRING_LEN};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load `dir/filename` into a sorted, normalized `PermittedSet`.
pub fn load(dir: &Path, filename: &str) -> PermittedSet {
    let path = dir.join(filename);

    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            info!("ACL file {} unavailable ({}), treating as unrestricted", path.display(), e);
            return PermittedSet::unrestricted();
        }
    };

    let mut addrs = Vec::new();
    // Split on raw bytes: a non-UTF-8 line is just another malformed line
    for (lineno, raw) in BufReader::new(file).split(b'\n').enumerate() {
        let raw = match raw {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    "ACL file {}: read error at line {} ({}), keeping {} addresses read so far",
                    path.display(),
                    lineno + 1,
                    e,
                    addrs.len()
                );
                break;
            }
        };

        let raw = raw.strip_suffix(b"\r").unwrap_or(&raw);
        let line = String::from_utf8_lossy(raw);

        if raw.len() != ADDRESS_STRING_LEN || !raw.is_ascii() {
            debug!(
                "During import from {} found wrong address: {} ({})",
                filename,
                line,
                raw.len()
            );
            continue;
        }

        addrs.push(normalize_line(&line));
    }

    PermittedSet::from_addrs(addrs)
}
