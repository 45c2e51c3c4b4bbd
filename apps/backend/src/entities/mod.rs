pub mod dice_picks;
pub mod dice_rolls;
pub mod drafted_games;
pub mod game_catalog;
pub mod leader_votes;
pub mod participants;
pub mod sessions;
pub mod statistics;
pub mod teams;
pub mod titles;
