//! Test helpers for generating unique test data
//!
//! Device tokens and room codes are derived from ULIDs so parallel tests never
//! collide on the per-session device index or the live room-code check.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("device");
/// let id2 = unique_str("device");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("device-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate an opaque device token the way a browser client would.
pub fn unique_device_token() -> String {
    unique_str("dev")
}

/// Generate a five character room code (`[A-Z0-9]`).
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_room_code;
///
/// let code = unique_room_code();
/// assert_eq!(code.len(), 5);
/// assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
/// ```
pub fn unique_room_code() -> String {
    // The tail of a ULID is the random component; Crockford base32 is already
    // upper-case alphanumeric.
    let ulid = Ulid::new().to_string();
    ulid[ulid.len() - 5..].to_string()
}
