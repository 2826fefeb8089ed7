use alloy::primitives::Address;
use node_acl::{Acl, AclConfig, Role, WatcherState};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const ADDR_ABC: &str = "0xabc0000000000000000000000000000000000abc";
const ADDR_DEF: &str = "0xdef0000000000000000000000000000000000def";

/// Replace a list file atomically so the refresher never reads a half-written file
fn write_atomic(path: &Path, contents: &str) {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).unwrap();
    fs::rename(&tmp, path).unwrap();
}

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

async fn wait_for<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..150 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_sender_list_only() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("allowed_from.txt"), format!("{}\n", ADDR_ABC)).unwrap();

    let acl = Acl::spawn(AclConfig::new(dir.path()).with_refresh_interval_ms(50)).unwrap();
    assert!(wait_for(|| acl.stats().cycles >= 1).await);

    assert!(acl.sender_permitted(&addr(ADDR_ABC)));
    assert!(!acl.sender_permitted(&addr(ADDR_DEF)));
    assert!(acl.recipient_permitted(&addr(ADDR_DEF)));
    assert!(acl.creator_permitted(&Address::ZERO));

    acl.stop().await;
    assert_eq!(acl.watcher_state(), WatcherState::Stopped);
}

#[tokio::test]
async fn test_mixed_case_file_matches_end_to_end() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("allowed_to.txt"),
        "0xABC0000000000000000000000000000000000ABC\nnot-an-address\n",
    )
    .unwrap();

    let acl = Acl::spawn(AclConfig::new(dir.path()).with_refresh_interval_ms(50)).unwrap();
    assert!(wait_for(|| acl.snapshot(Role::Recipient).len() == 1).await);

    assert!(acl.recipient_permitted(&addr(ADDR_ABC)));
    assert!(!acl.recipient_permitted(&addr(ADDR_DEF)));

    acl.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_see_whole_lists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("allowed_from.txt");

    // Two disjoint lists: old = {abc, x1..}, new = {def, y1..}
    let old: Vec<String> = (0..50).map(|i| format!("0x{:040x}", i)).chain([ADDR_ABC.to_string()]).collect();
    let new: Vec<String> = (100..150).map(|i| format!("0x{:040x}", i)).chain([ADDR_DEF.to_string()]).collect();
    write_atomic(&path, &old.join("\n"));

    let acl = Arc::new(Acl::spawn(AclConfig::new(dir.path()).with_refresh_interval_ms(5)).unwrap());
    assert!(wait_for(|| acl.snapshot(Role::Sender).len() == old.len()).await);

    let done = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();
    for _ in 0..4 {
        let acl = Arc::clone(&acl);
        let done = Arc::clone(&done);
        let (old_len, new_len) = (old.len(), new.len());
        readers.push(tokio::task::spawn_blocking(move || {
            while !done.load(Ordering::Relaxed) {
                let set = acl.snapshot(Role::Sender);
                let has_abc = set.contains(ADDR_ABC);
                let has_def = set.contains(ADDR_DEF);
                // Every snapshot is exactly one of the two lists
                assert!(has_abc != has_def);
                assert!(set.len() == old_len || set.len() == new_len);
                let _ = acl.sender_permitted(&Address::ZERO);
            }
        }));
    }

    for i in 0..20 {
        let list = if i % 2 == 0 { &new } else { &old };
        write_atomic(&path, &list.join("\n"));
        tokio::time::sleep(Duration::from_millis(15)).await;
    }

    done.store(true, Ordering::Relaxed);
    for r in readers {
        r.await.unwrap();
    }
    acl.stop().await;
}
