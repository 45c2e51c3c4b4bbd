use proptest::prelude::*;

use crate::domain::dice::{resolve, DiceOutcome};
use crate::domain::lifecycle::{ensure_game_step, game_ordinal};
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Winner is the argmin of |pick - target|; equal distances tie.
    #[test]
    fn prop_dice_winner_is_argmin(
        a in test_gens::die_face(),
        b in test_gens::die_face(),
        target in test_gens::die_face(),
    ) {
        let picks = vec![("a".to_string(), a), ("b".to_string(), b)];
        let (da, db) = ((a - target).abs(), (b - target).abs());
        match resolve(target, &picks) {
            DiceOutcome::Winner { team_id } => {
                prop_assert_ne!(da, db);
                let expected = if da < db { "a" } else { "b" };
                prop_assert_eq!(team_id.as_str(), expected);
            }
            DiceOutcome::Tied { team_ids } => {
                prop_assert_eq!(da, db);
                prop_assert_eq!(team_ids.len(), 2);
            }
        }
    }

    /// Any accepted sequence of game steps is non-decreasing in ordinal.
    #[test]
    fn prop_game_status_never_regresses(
        steps in prop::collection::vec(test_gens::game_status(), 0..20),
    ) {
        let mut current = crate::entities::drafted_games::GameStatus::Pending;
        for target in steps {
            if ensure_game_step(current, target).is_ok() {
                prop_assert!(game_ordinal(target) > game_ordinal(current));
                current = target;
            }
        }
    }
}
