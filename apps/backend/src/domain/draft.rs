//! Draft turn rotation.

/// The team after `current` in creation order, wrapping around.
///
/// With two teams this is the classic ping-pong handoff. An unknown
/// `current` hands the turn to the first team.
pub fn next_in_rotation(order: &[String], current: &str) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    let next = match order.iter().position(|t| t == current) {
        Some(idx) => (idx + 1) % order.len(),
        None => 0,
    };
    Some(order[next].clone())
}
