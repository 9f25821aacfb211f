//! Deterministic colours for category labels.

use sha2::{Digest, Sha256};

/// Returns a `#rrggbb` colour derived from the SHA-256 of `category`.
///
/// The same label always maps to the same colour, across runs and
/// processes.
#[must_use]
pub fn category_color(category: &str) -> String {
    let digest = Sha256::digest(category.as_bytes());
    format!("#{}", hex::encode(&digest[..3]))
}
