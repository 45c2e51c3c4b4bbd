//! SeaORM adapters. Functions here return `DbErr`; the repos layer maps it
//! to `DomainError`.

pub mod catalog_sea;
pub mod dice_sea;
pub mod drafted_games_sea;
pub mod leader_votes_sea;
pub mod participants_sea;
pub mod sessions_sea;
pub mod statistics_sea;
pub mod teams_sea;
pub mod titles_sea;
