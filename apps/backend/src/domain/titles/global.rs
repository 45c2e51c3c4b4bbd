//! Tournament-wide titles, awarded once after the final game.
//!
//! Every rule is independent; a participant can collect several global
//! titles and ties always award everyone tied.

use std::collections::HashSet;

use crate::config::engine::EngineConfig;
use crate::domain::titles::{all_tied_for_best, TitleGrant};

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub participant_id: String,
    pub team_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriorTitle {
    pub participant_id: String,
    pub drafted_game_id: String,
    pub is_humorous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTitlePoints {
    pub late_bloomer_ratio: f64,
    pub primary: f64,
    pub secondary: f64,
}

impl From<&EngineConfig> for GlobalTitlePoints {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            late_bloomer_ratio: cfg.late_bloomer_ratio,
            primary: cfg.primary_title_points,
            secondary: cfg.secondary_title_points,
        }
    }
}

impl Default for GlobalTitlePoints {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GlobalTitleInput<'a> {
    /// Players assigned to a team, in creation order.
    pub roster: &'a [RosterEntry],
    /// Completed drafted games in draft order.
    pub completed_games: &'a [String],
    /// Per-game titles awarded so far.
    pub game_titles: &'a [PriorTitle],
    /// `(drafted_game_id, participant_id)` for every submitted statistic.
    pub stat_submissions: &'a [(String, String)],
}

pub const MVP: &str = "MVP";
pub const LATE_BLOOMER: &str = "Late Bloomer";
pub const TITLE_HOARDER: &str = "Title Hoarder";
pub const IRON_MAN: &str = "Iron Man";
pub const GHOST: &str = "Ghost";
pub const VERSATILE: &str = "Versatile";
pub const CLASS_CLOWN: &str = "Class Clown";

pub fn compute_global_titles(
    input: &GlobalTitleInput<'_>,
    points: GlobalTitlePoints,
) -> Vec<TitleGrant> {
    let roster = input.roster;
    if roster.is_empty() || input.completed_games.is_empty() {
        return Vec::new();
    }

    let on_roster: HashSet<&str> = roster.iter().map(|r| r.participant_id.as_str()).collect();
    let titles: Vec<&PriorTitle> = input
        .game_titles
        .iter()
        .filter(|t| on_roster.contains(t.participant_id.as_str()))
        .collect();

    let count_for = |pred: &dyn Fn(&PriorTitle) -> bool| -> Vec<(String, usize)> {
        roster
            .iter()
            .map(|r| {
                let n = titles
                    .iter()
                    .filter(|t| t.participant_id == r.participant_id && pred(t))
                    .count();
                (r.participant_id.clone(), n)
            })
            .collect()
    };

    let totals = count_for(&|_| true);
    let total_of = |id: &str| {
        totals
            .iter()
            .find(|(p, _)| p == id)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    let mut grants = Vec::new();
    let mut award = |id: &str, name: &str, description: String, humorous: bool, pts: f64| {
        grants.push(TitleGrant {
            participant_id: id.to_string(),
            name: name.to_string(),
            description,
            is_humorous: humorous,
            points: pts,
        });
    };

    // Most titles overall.
    let top = totals.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if top > 0 {
        for id in all_tied_for_best(&totals, |a, b| a > b) {
            award(
                id,
                MVP,
                format!("Won the most titles of the tournament ({top})"),
                false,
                points.primary,
            );
        }
    }

    // Strongest showing in the final game, if it is a large enough share.
    if let Some(last_game) = input.completed_games.last() {
        let last = count_for(&|t| &t.drafted_game_id == last_game);
        let best = last.iter().map(|(_, n)| *n).max().unwrap_or(0);
        if best > 0 {
            for id in all_tied_for_best(&last, |a, b| a > b) {
                let needed = (total_of(id) as f64 * points.late_bloomer_ratio).ceil() as usize;
                if best >= needed {
                    award(
                        id,
                        LATE_BLOOMER,
                        format!("Saved the best for last: {best} title(s) in the final game"),
                        false,
                        points.secondary,
                    );
                }
            }
        }
    }

    // Members of the team that collected the most titles.
    let mut team_totals: Vec<(String, usize)> = Vec::new();
    for entry in roster {
        let n = total_of(&entry.participant_id);
        match team_totals.iter_mut().find(|(t, _)| *t == entry.team_id) {
            Some((_, sum)) => *sum += n,
            None => team_totals.push((entry.team_id.clone(), n)),
        }
    }
    let team_top = team_totals.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if team_top > 0 {
        for team_id in all_tied_for_best(&team_totals, |a, b| a > b) {
            for entry in roster.iter().filter(|r| r.team_id == team_id) {
                if total_of(&entry.participant_id) > 0 {
                    award(
                        &entry.participant_id,
                        TITLE_HOARDER,
                        format!("On the team that hoarded the most titles ({team_top})"),
                        false,
                        points.secondary,
                    );
                }
            }
        }
    }

    // Statistics in every completed game.
    let game_count = input.completed_games.len();
    if game_count > 1 {
        for entry in roster {
            let played: HashSet<&str> = input
                .stat_submissions
                .iter()
                .filter(|(_, p)| *p == entry.participant_id)
                .map(|(g, _)| g.as_str())
                .collect();
            if input
                .completed_games
                .iter()
                .all(|g| played.contains(g.as_str()))
            {
                award(
                    &entry.participant_id,
                    IRON_MAN,
                    format!("Showed up for every game ({game_count}/{game_count})"),
                    false,
                    points.secondary,
                );
            }
        }
    }

    // No titles at all.
    for (id, n) in &totals {
        if *n == 0 {
            award(
                id,
                GHOST,
                "Made it through the whole tournament without a single title".to_string(),
                true,
                points.secondary,
            );
        }
    }

    // Titles in the most distinct games.
    let spread: Vec<(String, usize)> = roster
        .iter()
        .map(|r| {
            let games: HashSet<&str> = titles
                .iter()
                .filter(|t| t.participant_id == r.participant_id)
                .map(|t| t.drafted_game_id.as_str())
                .collect();
            (r.participant_id.clone(), games.len())
        })
        .collect();
    let widest = spread.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if widest > 1 {
        for id in all_tied_for_best(&spread, |a, b| a > b) {
            award(
                id,
                VERSATILE,
                format!("Took titles in {widest} different games"),
                false,
                points.secondary,
            );
        }
    }

    // Most humorous titles.
    let funny = count_for(&|t| t.is_humorous);
    let funniest = funny.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if funniest > 0 {
        for id in all_tied_for_best(&funny, |a, b| a > b) {
            award(
                id,
                CLASS_CLOWN,
                format!("Collected the most humorous titles ({funniest})"),
                true,
                points.secondary,
            );
        }
    }

    grants
}
