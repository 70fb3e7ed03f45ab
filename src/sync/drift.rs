//! Drift detection between source and replica

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Indices at which `a` and `b` differ.
///
/// Within the common length every mismatching index is listed; when the
/// lengths differ every index of the longer tail is appended. The result can
/// be non-contiguous.
pub fn find_differences(a: &[u8], b: &[u8]) -> Vec<usize> {
    let min_len = a.len().min(b.len());
    let max_len = a.len().max(b.len());

    let mut indices: Vec<usize> = a[..min_len]
        .iter()
        .zip(&b[..min_len])
        .enumerate()
        .filter(|(_, (x, y))| x != y)
        .map(|(i, _)| i)
        .collect();
    indices.extend(min_len..max_len);
    indices
}

/// A repair applied to the replica before new bytes were written.
///
/// The patch is one contiguous run starting at the first differing index and
/// as long as the number of differing indices. For scattered differences
/// this can miss bytes past the run; it is a heuristic, not a full resync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftRepair {
    pub differing: Vec<usize>,
    pub patch_offset: u64,
    pub patch_len: u64,
    /// Bytes actually copied (shorter than `patch_len` at source EOF)
    pub bytes_patched: usize,
}

impl DriftRepair {
    pub fn is_contiguous(&self) -> bool {
        self.differing
            .windows(2)
            .all(|pair| pair[1] == pair[0] + 1)
    }
}

/// Result of the whole-file comparison run at the expected total size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub total_size: u64,
    pub differing: Vec<usize>,
    pub source_digest: String,
    pub replica_digest: String,
}

impl Verification {
    pub fn new(total_size: u64, source: &[u8], replica: &[u8]) -> Self {
        Self {
            total_size,
            differing: find_differences(source, replica),
            source_digest: sha256_hex(source),
            replica_digest: sha256_hex(replica),
        }
    }

    pub fn matches(&self) -> bool {
        self.differing.is_empty()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}
