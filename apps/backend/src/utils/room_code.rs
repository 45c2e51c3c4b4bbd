//! Room codes: the short code people type to join a session.
//!
//! A valid code is 1 to 5 characters of `[A-Z0-9]`. Input is trimmed and
//! upper-cased before validation so "ab1" and "AB1" name the same room.

use lazy_regex::regex_is_match;
use rand::Rng;

use crate::errors::domain::{DomainError, ValidationKind};

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U
const GENERATED_LEN: usize = 5;

/// Normalize and validate a user-entered room code.
pub fn normalize_room_code(raw: &str) -> Result<String, DomainError> {
    let code = raw.trim().to_ascii_uppercase();
    if regex_is_match!(r"^[A-Z0-9]{1,5}$", &code) {
        Ok(code)
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidRoomCode,
            format!("room code '{}' must be 1-5 letters or digits", raw.trim()),
        ))
    }
}

/// Suggest a room code when the referee does not choose one.
///
/// Uses Crockford's alphabet so generated codes avoid look-alike letters.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}
