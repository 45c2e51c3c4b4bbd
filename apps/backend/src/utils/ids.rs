//! Identifier generation.
//!
//! All entity ids are ULID strings from one process-wide monotonic
//! generator, so ids minted within the same millisecond still sort in
//! creation order. Creation order is load-bearing: it decides draft
//! rotation and which team is "first".

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use ulid::{Generator, Ulid};

static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

/// Mint a new id.
pub fn new_id() -> String {
    // Generator only fails when the random component would overflow within
    // one millisecond; a fresh non-monotonic ULID is still unique.
    GENERATOR
        .lock()
        .generate()
        .unwrap_or_else(|_| Ulid::new())
        .to_string()
}
