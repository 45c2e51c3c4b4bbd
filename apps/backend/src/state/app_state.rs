use sea_orm::DatabaseConnection;

use crate::engine::TournamentEngine;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    engine: TournamentEngine,
}

impl AppState {
    pub fn new(engine: TournamentEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &TournamentEngine {
        &self.engine
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.engine.db()
    }
}
