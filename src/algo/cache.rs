//! Result-set metadata and input hashing.
//!
//! This module is always compiled (no feature gate). Only the storage backend
//! (`storage.rs`) requires the `cache` feature with rusqlite.

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use super::model::KeywordInput;

/// Metadata stored alongside a persisted result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMeta {
    /// SipHash of the keyword batch that produced the results.
    pub input_hash: u64,
    /// Number of keywords sent to the classifier.
    pub keyword_count: usize,
    /// Number of classified records kept.
    pub record_count: usize,
    /// Crate version when the results were stored.
    pub version: String,
    /// Unix timestamp when the results were stored.
    pub created_at: u64,
}

impl StoredMeta {
    /// Metadata for a fresh result set, stamped with the current version and time.
    pub fn new(inputs: &[KeywordInput], record_count: usize) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            input_hash: input_hash(inputs),
            keyword_count: inputs.len(),
            record_count,
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at,
        }
    }
}

/// Order-sensitive hash of a keyword batch (term and volume per line).
pub fn input_hash(inputs: &[KeywordInput]) -> u64 {
    let mut hasher = SipHasher13::new();
    for input in inputs {
        input.term.hash(&mut hasher);
        input.volume.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<KeywordInput> {
        vec![
            KeywordInput::new("fake plants", 18100),
            KeywordInput::new("faux plants", 6600),
        ]
    }

    #[test]
    fn input_hash_deterministic() {
        assert_eq!(input_hash(&batch()), input_hash(&batch()));
    }

    #[test]
    fn input_hash_changes_with_volume_and_order() {
        let base = input_hash(&batch());
        let mut changed = batch();
        changed[1].volume = 6601;
        assert_ne!(base, input_hash(&changed));

        let mut reversed = batch();
        reversed.reverse();
        assert_ne!(base, input_hash(&reversed));
    }

    #[test]
    fn meta_new_has_current_version() {
        let meta = StoredMeta::new(&batch(), 2);
        assert_eq!(meta.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(meta.keyword_count, 2);
        assert_eq!(meta.record_count, 2);
        assert!(meta.created_at > 0);
        assert_eq!(meta.input_hash, input_hash(&batch()));
    }
}
