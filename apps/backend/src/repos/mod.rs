//! Repository functions: domain models over the sea-orm adapters.

pub mod catalog;
pub mod dice;
pub mod drafted_games;
pub mod leader_votes;
pub mod participants;
pub mod sessions;
pub mod statistics;
pub mod teams;
pub mod titles;
