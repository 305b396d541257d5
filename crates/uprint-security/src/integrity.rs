// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fingerprints — SHA-256 hashing for log correlation.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
///
/// Submission logs record this instead of file contents, so an uploaded
/// document can be matched against a local copy after the fact.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// First 12 hex characters of the SHA-256, short enough for a log field.
pub fn short_fingerprint(data: &[u8]) -> String {
    let mut full = hash_bytes(data);
    full.truncate(12);
    full
}
