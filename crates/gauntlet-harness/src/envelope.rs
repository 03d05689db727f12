//! Run identity fingerprinting.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use gauntlet_core::Contract;

/// SHA-256 fingerprint of a submission unit + contract pair.
///
/// Used as the log trace id so every line of one invocation joins on one
/// key; never part of the validated response.
#[must_use]
pub fn run_fingerprint(unit_text: &str, contract: &Contract) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unit_text.as_bytes());
    if let Ok(contract_bytes) = serde_json::to_vec(contract) {
        hasher.update(&contract_bytes);
    }
    hex_lower(&hasher.finalize())
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
