//! Derived ceremony and scoreboard views.

use serde::Serialize;

/// Team score: total points of the titles held by its current members.
pub fn team_score<'a>(
    member_ids: &[&str],
    titles: impl IntoIterator<Item = (&'a str, f64)>,
) -> f64 {
    titles
        .into_iter()
        .filter(|(p, _)| member_ids.contains(p))
        .map(|(_, pts)| pts)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team_id: String,
    pub name: String,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    pub teams: Vec<TeamStanding>,
    /// Strict top team; `None` while tied or empty.
    pub champion_team_id: Option<String>,
    pub tied: bool,
}

/// Rank teams by score, keeping creation order among equal scores.
///
/// `teams` must be in creation order.
pub fn rank_teams(teams: Vec<(String, String, f64)>) -> Standings {
    let mut ordered: Vec<(usize, String, String, f64)> = teams
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, score))| (i, id, name, score))
        .collect();
    ordered.sort_by(|a, b| b.3.total_cmp(&a.3).then(a.0.cmp(&b.0)));

    let tied = ordered.len() > 1 && ordered[0].3 == ordered[1].3;
    let champion_team_id = match ordered.first() {
        Some(top) if !tied => Some(top.1.clone()),
        _ => None,
    };

    let mut rank = 0;
    let mut prev: Option<f64> = None;
    let teams = ordered
        .into_iter()
        .enumerate()
        .map(|(pos, (_, team_id, name, score))| {
            if prev != Some(score) {
                rank = pos + 1;
                prev = Some(score);
            }
            TeamStanding {
                team_id,
                name,
                score,
                rank,
            }
        })
        .collect();

    Standings {
        teams,
        champion_team_id,
        tied,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub participant_id: String,
    pub name: String,
    pub team_id: Option<String>,
    pub titles: usize,
    pub humorous: usize,
    pub points: f64,
}

/// Order by title count, then points, then name.
pub fn sort_leaderboard(rows: &mut [LeaderboardRow]) {
    rows.sort_by(|a, b| {
        b.titles
            .cmp(&a.titles)
            .then(b.points.total_cmp(&a.points))
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_counts_only_current_members() {
        let titles = vec![("a", 1.0), ("b", 0.5), ("gone", 3.0)];
        assert_eq!(team_score(&["a", "b"], titles), 1.5);
    }

    #[test]
    fn champion_requires_strict_lead() {
        let s = rank_teams(vec![
            ("red".into(), "Red".into(), 2.0),
            ("blue".into(), "Blue".into(), 3.5),
        ]);
        assert_eq!(s.champion_team_id.as_deref(), Some("blue"));
        assert!(!s.tied);
        assert_eq!(s.teams[0].rank, 1);
        assert_eq!(s.teams[1].team_id, "red");

        let s = rank_teams(vec![
            ("red".into(), "Red".into(), 2.0),
            ("blue".into(), "Blue".into(), 2.0),
        ]);
        assert!(s.tied);
        assert_eq!(s.champion_team_id, None);
        assert_eq!(s.teams[0].team_id, "red");
        assert_eq!(s.teams[1].rank, 1);
    }

    #[test]
    fn leaderboard_order() {
        let row = |id: &str, titles, points| LeaderboardRow {
            participant_id: id.into(),
            name: id.into(),
            team_id: None,
            titles,
            humorous: 0,
            points,
        };
        let mut rows = vec![row("c", 1, 1.0), row("b", 2, 1.0), row("a", 2, 1.5)];
        sort_leaderboard(&mut rows);
        let order: Vec<_> = rows.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}
