//! Title scoring: per-game rules and tournament-wide awards.
//!
//! Everything here is pure. Callers load statistics, prior titles and the
//! roster, and persist whatever grants come back.

pub mod game_rules;
pub mod global;

pub use game_rules::{GameTitleRule, StatLeaders, StatLine, TitleRuleRegistry};
pub use global::{compute_global_titles, GlobalTitleInput, GlobalTitlePoints};

use serde::Serialize;

/// A title to be written for one participant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleGrant {
    pub participant_id: String,
    pub name: String,
    pub description: String,
    pub is_humorous: bool,
    pub points: f64,
}

/// Everyone whose value equals the best one, in input order.
///
/// Returns an empty list when `values` is empty.
pub(crate) fn all_tied_for_best<'a, T, F>(values: &'a [(String, T)], better: F) -> Vec<&'a str>
where
    T: PartialEq + Copy,
    F: Fn(T, T) -> bool,
{
    let Some(best) = values
        .iter()
        .map(|(_, v)| *v)
        .reduce(|acc, v| if better(v, acc) { v } else { acc })
    else {
        return Vec::new();
    };
    values
        .iter()
        .filter(|(_, v)| *v == best)
        .map(|(id, _)| id.as_str())
        .collect()
}
