// Proptest generators for domain types.

use proptest::prelude::*;

use crate::domain::election::Ballot;
use crate::entities::drafted_games::GameStatus;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Team of 1..=6 members named `m0..`.
pub fn members() -> impl Strategy<Value = Vec<String>> {
    (1usize..=6).prop_map(|n| (0..n).map(|i| format!("m{i}")).collect())
}

/// Members plus ballots among them (and the occasional outsider).
pub fn members_and_ballots() -> impl Strategy<Value = (Vec<String>, Vec<Ballot>)> {
    members().prop_flat_map(|members| {
        let n = members.len();
        let ballot = (0..=n, 0..=n).prop_map(move |(v, c)| {
            let name = |i: usize| {
                if i == n {
                    "outsider".to_string()
                } else {
                    format!("m{i}")
                }
            };
            Ballot::new(name(v), name(c))
        });
        (Just(members), prop::collection::vec(ballot, 0..12))
    })
}

pub fn die_face() -> impl Strategy<Value = i16> {
    1i16..=6
}

pub fn game_status() -> impl Strategy<Value = GameStatus> {
    prop_oneof![
        Just(GameStatus::Pending),
        Just(GameStatus::Active),
        Just(GameStatus::Scoring),
        Just(GameStatus::Titles),
        Just(GameStatus::Completed),
    ]
}
