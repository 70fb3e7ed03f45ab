//! Tests for the sync engine

use super::*;
use crate::error::MirrorError;
use crate::watcher::ChangeRecord;
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    source: PathBuf,
    replica: PathBuf,
    size: u64,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.bin");
        let replica = dir.path().join("out").join("replica.bin");
        fs::write(&source, b"").unwrap();
        Self {
            _dir: dir,
            source,
            replica,
            size: 0,
        }
    }

    /// Append to the source and build the record the coordinator would emit
    fn append(&mut self, bytes: &[u8]) -> ChangeRecord {
        let mut f = fs::OpenOptions::new()
            .append(true)
            .open(&self.source)
            .unwrap();
        f.write_all(bytes).unwrap();
        let last = self.size;
        self.size += bytes.len() as u64;
        ChangeRecord::append(&self.source, Utc::now(), last, self.size)
    }

    fn engine(&self, expected_total_size: Option<u64>) -> ReplicaSyncEngine {
        ReplicaSyncEngine::open(
            &self.replica,
            EngineOptions {
                expected_total_size,
                lock: false,
            },
        )
        .unwrap()
    }
}

fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[test]
fn test_find_differences_equal() {
    assert!(find_differences(b"abc", b"abc").is_empty());
    assert!(find_differences(b"", b"").is_empty());
}

#[test]
fn test_find_differences_scattered_and_tail() {
    assert_eq!(find_differences(b"abcdef", b"aXcdYf"), vec![1, 4]);
    assert_eq!(find_differences(b"ab", b"abcd"), vec![2, 3]);
    assert_eq!(find_differences(b"aXcd", b"ab"), vec![1, 2, 3]);
}

#[test]
fn test_find_differences_single_region() {
    let source = pattern(150, 1);
    let mut replica = source.clone();
    for b in &mut replica[60..65] {
        *b = !*b;
    }
    assert_eq!(find_differences(&replica, &source), (60..65).collect::<Vec<_>>());
}

#[test]
fn test_read_range_tolerates_eof() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.bin");
    fs::write(&path, b"0123456789").unwrap();
    let file = fs::File::open(&path).unwrap();

    assert_eq!(read_range(&file, 2, 3).unwrap(), b"234");
    assert_eq!(read_range(&file, 8, 10).unwrap(), b"89");
    assert!(read_range(&file, 20, 4).unwrap().is_empty());
}

#[test]
fn test_verification_digests() {
    let ok = Verification::new(3, b"abc", b"abc");
    assert!(ok.matches());
    assert_eq!(ok.source_digest, ok.replica_digest);
    assert!(ok.source_digest.starts_with("sha256:"));

    let bad = Verification::new(3, b"abc", b"abd");
    assert!(!bad.matches());
    assert_eq!(bad.differing, vec![2]);
    assert_ne!(bad.source_digest, bad.replica_digest);
}

#[test]
fn test_engine_creates_replica_and_parent() {
    let fx = Fixture::new();
    let engine = fx.engine(None);
    assert!(fx.replica.exists());
    assert_eq!(engine.total_size(), 0);
    assert_eq!(engine.phase(), SyncPhase::Init);
    assert_eq!(engine.replica_path(), fx.replica.as_path());
}

#[test]
fn test_engine_appends_ranges() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);

    let first = fx.append(&pattern(100, 3));
    let outcome = engine.apply(&first).unwrap();
    assert_eq!(outcome.bytes_written, 100);
    assert!(outcome.drift.is_none());
    assert_eq!(read(&fx.replica), read(&fx.source));

    let second = fx.append(&pattern(50, 9));
    let outcome = engine.apply(&second).unwrap();
    assert_eq!(outcome.total_size, 150);
    assert_eq!(read(&fx.replica), read(&fx.source));
    assert_eq!(engine.phase(), SyncPhase::Streaming);
}

#[test]
fn test_engine_skips_zero_delta() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    engine.apply(&fx.append(b"hello")).unwrap();
    let before = read(&fx.replica);

    // Same size as last time
    let noop = ChangeRecord::append(&fx.source, Utc::now(), 5, 5);
    let outcome = engine.apply(&noop).unwrap();

    assert!(outcome.skipped);
    assert_eq!(outcome.bytes_written, 0);
    assert_eq!(outcome.total_size, 5);
    assert_eq!(read(&fx.replica), before);
}

#[test]
fn test_engine_rejects_malformed_record() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    let mut record = fx.append(b"abcdef");
    record.delta_size = 2;

    let err = engine.apply(&record).unwrap_err();
    assert!(matches!(err, MirrorError::MalformedRecord { .. }));
    assert!(read(&fx.replica).is_empty());
    assert_eq!(engine.total_size(), 0);
}

#[test]
fn test_engine_replay_overwrites_same_bytes() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    let record = fx.append(&pattern(100, 5));

    engine.apply(&record).unwrap();
    let after_first = read(&fx.replica);
    let outcome = engine.apply(&record).unwrap();

    // Same bytes land at the same offset; only the counter moves.
    assert_eq!(read(&fx.replica), after_first);
    assert!(outcome.drift.is_none());
    assert_eq!(engine.total_size(), 200);
}

#[test]
fn test_engine_repairs_single_region_drift() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    engine.apply(&fx.append(&pattern(100, 1))).unwrap();
    engine.apply(&fx.append(&pattern(50, 2))).unwrap();

    let mut corrupted = read(&fx.replica);
    for b in &mut corrupted[60..65] {
        *b = !*b;
    }
    fs::write(&fx.replica, &corrupted).unwrap();

    let outcome = engine.apply(&fx.append(&pattern(10, 3))).unwrap();
    let drift = outcome.drift.expect("drift should be detected");

    assert_eq!(drift.differing, (60..65).collect::<Vec<_>>());
    assert_eq!(drift.patch_offset, 60);
    assert_eq!(drift.patch_len, 5);
    assert!(drift.is_contiguous());
    assert_eq!(engine.phase(), SyncPhase::Patched);
    assert_eq!(read(&fx.replica).len(), 160);
    assert_eq!(read(&fx.replica), read(&fx.source));
}

#[test]
fn test_engine_scattered_drift_uses_contiguous_patch() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    engine.apply(&fx.append(&pattern(40, 1))).unwrap();

    let mut corrupted = read(&fx.replica);
    corrupted[5] = !corrupted[5];
    corrupted[30] = !corrupted[30];
    fs::write(&fx.replica, &corrupted).unwrap();

    let outcome = engine.apply(&fx.append(&pattern(4, 7))).unwrap();
    let drift = outcome.drift.unwrap();

    // Two differing bytes -> two bytes copied from index 5; index 30 stays wrong.
    assert_eq!(drift.differing, vec![5, 30]);
    assert_eq!(drift.patch_offset, 5);
    assert_eq!(drift.patch_len, 2);
    assert!(!drift.is_contiguous());

    let replica = read(&fx.replica);
    let source = read(&fx.source);
    assert_eq!(replica[5], source[5]);
    assert_ne!(replica[30], source[30]);
    assert_eq!(replica[40..], source[40..]);
}

#[test]
fn test_engine_refills_missing_replica_prefix() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    engine.apply(&fx.append(&pattern(32, 4))).unwrap();

    fs::write(&fx.replica, b"").unwrap();
    let outcome = engine.apply(&fx.append(&pattern(8, 5))).unwrap();

    let drift = outcome.drift.unwrap();
    assert_eq!(drift.patch_offset, 0);
    assert_eq!(drift.bytes_patched, 32);
    assert_eq!(read(&fx.replica), read(&fx.source));
}

#[test]
fn test_engine_truncate_record() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    engine.apply(&fx.append(&pattern(64, 4))).unwrap();

    fs::write(&fx.source, &pattern(64, 4)[..20]).unwrap();
    let record = ChangeRecord::truncate(&fx.source, Utc::now(), 64, 20);
    let outcome = engine.apply(&record).unwrap();

    assert_eq!(outcome.truncated_to, Some(20));
    assert_eq!(outcome.total_size, 20);
    assert_eq!(read(&fx.replica), read(&fx.source));
}

#[test]
fn test_engine_verifies_at_expected_total() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(Some(30));

    let first = engine.apply(&fx.append(&pattern(10, 1))).unwrap();
    assert!(first.verification.is_none());

    let second = engine.apply(&fx.append(&pattern(20, 2))).unwrap();
    let verification = second.verification.expect("expected verification");
    assert!(verification.matches());
    assert_eq!(verification.total_size, 30);
    assert_eq!(engine.phase(), SyncPhase::Verified);
}

#[test]
fn test_engine_verification_reports_without_repairing() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(Some(20));
    engine.apply(&fx.append(&pattern(10, 1))).unwrap();

    // Source rewritten in place behind the engine's back after the next range is read
    let record = fx.append(&pattern(10, 2));
    let mut source = read(&fx.source);
    source.push(0xAA);
    fs::write(&fx.source, &source).unwrap();

    let outcome = engine.apply(&record).unwrap();
    let verification = outcome.verification.unwrap();
    assert!(!verification.matches());
    assert_eq!(verification.differing, vec![20]);
    assert_eq!(read(&fx.replica).len(), 20);
}

#[test]
fn test_engine_lock_excludes_second_engine() {
    let fx = Fixture::new();
    let options = EngineOptions {
        expected_total_size: None,
        lock: true,
    };
    let _first = ReplicaSyncEngine::open(&fx.replica, options.clone()).unwrap();
    let second = ReplicaSyncEngine::open(&fx.replica, options);

    assert!(matches!(second, Err(MirrorError::ReplicaLocked { .. })));
}

#[test]
fn test_engine_fails_on_missing_source() {
    let mut fx = Fixture::new();
    let mut engine = fx.engine(None);
    let record = fx.append(b"abc");
    fs::remove_file(&fx.source).unwrap();

    let err = engine.apply(&record).unwrap_err();
    assert!(matches!(err, MirrorError::FileIo { .. }));
}
