//! Domain layer: pure tournament rules.

pub mod dice;
pub mod draft;
pub mod election;
pub mod lifecycle;
pub mod standings;
pub mod stat_schema;
pub mod titles;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_global_titles;
#[cfg(test)]
mod tests_props_dice;
#[cfg(test)]
mod tests_props_election;

pub use dice::{DiceOutcome, DicePhase, DiceSource, OsDice, ScriptedDice, SeededDice};
pub use election::{Ballot, ElectionOutcome};
pub use stat_schema::{Pick, StatField, StatSchema, TitleSpec};
pub use titles::{GameTitleRule, TitleGrant, TitleRuleRegistry};
