use std::sync::Arc;

use crate::config::db::DbKind;
use crate::config::engine::EngineConfig;
use crate::domain::dice::DiceSource;
use crate::engine::TournamentEngine;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for `AppState`, shared by the server binary and the tests.
pub struct StateBuilder {
    db_kind: DbKind,
    config: EngineConfig,
    dice: Option<Arc<dyn DiceSource>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_kind: DbKind::SqliteMemory,
            config: EngineConfig::default(),
            dice: None,
        }
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = kind;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_dice(mut self, dice: Arc<dyn DiceSource>) -> Self {
        self.dice = Some(dice);
        self
    }

    /// Connect, migrate and wire the engine.
    pub async fn build(self) -> Result<AppState, AppError> {
        self.config.validate()?;
        let conn = bootstrap_db(self.db_kind).await?;
        let mut engine = TournamentEngine::new(conn, self.config);
        if let Some(dice) = self.dice {
            engine = engine.with_dice(dice);
        }
        Ok(AppState::new(engine))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_defaults_to_migrated_memory_db() {
        let state = build_state().build().await.unwrap();
        assert_eq!(state.engine().config(), &EngineConfig::default());
        state.db().ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let bad = EngineConfig {
            event_buffer: 0,
            ..EngineConfig::default()
        };
        let err = build_state().with_config(bad).build().await.err().unwrap();
        assert_eq!(err.code(), crate::errors::ErrorCode::ConfigError);
    }
}
