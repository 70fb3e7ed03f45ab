//! Property tests for the append-only replica invariant.

use std::fs;
use std::io::Write;

use chrono::Utc;
use proptest::prelude::*;

use filemirror::{ChangeRecord, EngineOptions, ReplicaSyncEngine};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Without drift, the replica equals the source after every record.
    #[test]
    fn property_append_only_replica_matches_source(
        chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..200),
            1..12,
        ),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.bin");
        let replica = dir.path().join("replica.bin");
        fs::write(&source, b"").unwrap();

        let mut engine = ReplicaSyncEngine::open(
            &replica,
            EngineOptions { expected_total_size: None, lock: false },
        ).unwrap();

        let mut size = 0u64;
        for chunk in &chunks {
            let mut f = fs::OpenOptions::new().append(true).open(&source).unwrap();
            f.write_all(chunk).unwrap();
            drop(f);

            let record = ChangeRecord::append(&source, Utc::now(), size, size + chunk.len() as u64);
            size += chunk.len() as u64;
            prop_assert!(record.validate().is_ok());

            let outcome = engine.apply(&record).unwrap();
            prop_assert!(outcome.drift.is_none());
            prop_assert_eq!(outcome.total_size, size);
            prop_assert_eq!(fs::read(&replica).unwrap(), fs::read(&source).unwrap());
        }
    }
}
