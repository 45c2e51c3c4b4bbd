//! First-pick dice roll: pick validation, winner resolution and the
//! server-side die.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::errors::domain::{DomainError, ValidationKind};

pub const DIE_FACES: RangeInclusive<i16> = 1..=6;

/// Source of dice targets. Implementations must only ever return a face in
/// [`DIE_FACES`].
pub trait DiceSource: Send + Sync {
    fn roll(&self) -> i16;
}

/// Uniform OS-seeded die used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsDice;

impl DiceSource for OsDice {
    fn roll(&self) -> i16 {
        rand::rng().random_range(DIE_FACES)
    }
}

/// Reproducible die for local runs, selected by `EngineConfig::dice_seed`.
pub struct SeededDice {
    rng: Mutex<ChaCha8Rng>,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll(&self) -> i16 {
        self.rng.lock().random_range(DIE_FACES)
    }
}

/// Die that replays a fixed sequence, cycling when exhausted.
pub struct ScriptedDice {
    faces: Mutex<VecDeque<i16>>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = i16>) -> Self {
        let faces: VecDeque<i16> = faces
            .into_iter()
            .map(|f| f.clamp(*DIE_FACES.start(), *DIE_FACES.end()))
            .collect();
        Self {
            faces: Mutex::new(faces),
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&self) -> i16 {
        let mut faces = self.faces.lock();
        match faces.pop_front() {
            Some(face) => {
                faces.push_back(face);
                face
            }
            None => *DIE_FACES.start(),
        }
    }
}

pub fn validate_pick(value: i64) -> Result<i16, DomainError> {
    match i16::try_from(value) {
        Ok(v) if DIE_FACES.contains(&v) => Ok(v),
        _ => Err(DomainError::validation(
            ValidationKind::InvalidDiceValue,
            format!("value must be between 1 and 6, got {value}"),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiceOutcome {
    Winner { team_id: String },
    Tied { team_ids: Vec<String> },
}

/// The team whose pick is closest to `target` wins; an exact tie for the
/// smallest distance yields no winner.
pub fn resolve(target: i16, picks: &[(String, i16)]) -> DiceOutcome {
    let best = picks
        .iter()
        .map(|(_, v)| (v - target).abs())
        .min()
        .unwrap_or(i16::MAX);
    let closest: Vec<String> = picks
        .iter()
        .filter(|(_, v)| (v - target).abs() == best)
        .map(|(team, _)| team.clone())
        .collect();

    match closest.as_slice() {
        [only] => DiceOutcome::Winner {
            team_id: only.clone(),
        },
        _ => DiceOutcome::Tied { team_ids: closest },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DicePhase {
    /// Collecting picks; no target yet.
    Picking,
    /// Target and winner known, awaiting confirmation.
    Revealing,
    /// Winner confirmed; drafting has begun.
    Resolved,
    /// Target known but no unique winner; needs a re-roll.
    Tied,
}

pub fn phase(target: Option<i16>, has_winner: bool, confirmed: bool) -> DicePhase {
    match (target, has_winner, confirmed) {
        (_, true, true) => DicePhase::Resolved,
        (None, _, _) => DicePhase::Picking,
        (Some(_), true, false) => DicePhase::Revealing,
        (Some(_), false, _) => DicePhase::Tied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(a: i16, b: i16) -> Vec<(String, i16)> {
        vec![("red".into(), a), ("blue".into(), b)]
    }

    #[test]
    fn closer_pick_wins() {
        assert_eq!(
            resolve(6, &picks(3, 5)),
            DiceOutcome::Winner {
                team_id: "blue".into()
            }
        );
        assert_eq!(
            resolve(1, &picks(2, 6)),
            DiceOutcome::Winner {
                team_id: "red".into()
            }
        );
    }

    #[test]
    fn equal_distance_is_a_tie() {
        assert_eq!(
            resolve(4, &picks(3, 5)),
            DiceOutcome::Tied {
                team_ids: vec!["red".into(), "blue".into()]
            }
        );
        assert!(matches!(resolve(2, &picks(2, 2)), DiceOutcome::Tied { .. }));
    }

    #[test]
    fn picks_outside_the_die_are_rejected() {
        assert!(validate_pick(0).is_err());
        assert!(validate_pick(7).is_err());
        assert!(validate_pick(i64::MAX).is_err());
        assert_eq!(validate_pick(6).unwrap(), 6);
    }

    #[test]
    fn scripted_dice_cycle() {
        let dice = ScriptedDice::new([6, 4]);
        assert_eq!(dice.roll(), 6);
        assert_eq!(dice.roll(), 4);
        assert_eq!(dice.roll(), 6);
    }

    #[test]
    fn seeded_dice_are_reproducible_and_in_range() {
        let a = SeededDice::new(7);
        let b = SeededDice::new(7);
        for _ in 0..50 {
            let face = a.roll();
            assert!(DIE_FACES.contains(&face));
            assert_eq!(face, b.roll());
        }
    }

    #[test]
    fn phases() {
        assert_eq!(phase(None, false, false), DicePhase::Picking);
        assert_eq!(phase(Some(4), true, false), DicePhase::Revealing);
        assert_eq!(phase(Some(4), false, false), DicePhase::Tied);
        assert_eq!(phase(Some(4), true, true), DicePhase::Resolved);
    }
}
