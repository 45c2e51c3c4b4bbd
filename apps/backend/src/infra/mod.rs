//! Database bootstrap, `DbErr` translation and `AppState` assembly.

pub mod db;
pub mod db_errors;
pub mod state;
