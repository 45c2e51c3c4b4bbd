//! Tournament tuning constants.
//!
//! None of these are invariants of the engine; they are the defaults the
//! game shipped with and can be overridden per deployment through the
//! `ENGINE_*` environment variables.

use std::env;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Share of a participant's titles that must come from the final game
    /// for the late-bloomer award.
    pub late_bloomer_ratio: f64,
    /// Points for the headline global title (most titles overall).
    pub primary_title_points: f64,
    /// Points for every other global title.
    pub secondary_title_points: f64,
    /// Default points for a per-game title whose schema does not say.
    pub game_title_points: f64,
    /// Upper bound for a session's round-count target.
    pub max_round_target: i32,
    /// Per-session broadcast buffer; slower subscribers are told to resync.
    pub event_buffer: usize,
    /// Seed for a reproducible die (`ENGINE_DICE_SEED`); unset rolls from
    /// the OS.
    pub dice_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            late_bloomer_ratio: 0.4,
            primary_title_points: 1.0,
            secondary_title_points: 0.5,
            game_title_points: 1.0,
            max_round_target: 10,
            event_buffer: 256,
            dice_seed: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with any `ENGINE_*` variables that are set.
    pub fn from_env() -> Result<Self, AppError> {
        let mut cfg = Self::default();
        override_from_env("ENGINE_LATE_BLOOMER_RATIO", &mut cfg.late_bloomer_ratio)?;
        override_from_env("ENGINE_PRIMARY_TITLE_POINTS", &mut cfg.primary_title_points)?;
        override_from_env(
            "ENGINE_SECONDARY_TITLE_POINTS",
            &mut cfg.secondary_title_points,
        )?;
        override_from_env("ENGINE_GAME_TITLE_POINTS", &mut cfg.game_title_points)?;
        override_from_env("ENGINE_MAX_ROUND_TARGET", &mut cfg.max_round_target)?;
        override_from_env("ENGINE_EVENT_BUFFER", &mut cfg.event_buffer)?;
        if env::var("ENGINE_DICE_SEED").is_ok() {
            let mut seed = 0u64;
            override_from_env("ENGINE_DICE_SEED", &mut seed)?;
            cfg.dice_seed = Some(seed);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=1.0).contains(&self.late_bloomer_ratio) {
            return Err(AppError::config(
                "ENGINE_LATE_BLOOMER_RATIO must be within 0.0..=1.0",
            ));
        }
        if self.primary_title_points < 0.0
            || self.secondary_title_points < 0.0
            || self.game_title_points < 0.0
        {
            return Err(AppError::config("title points must be non-negative"));
        }
        if self.max_round_target < 1 {
            return Err(AppError::config("ENGINE_MAX_ROUND_TARGET must be >= 1"));
        }
        if self.event_buffer == 0 {
            return Err(AppError::config("ENGINE_EVENT_BUFFER must be > 0"));
        }
        Ok(())
    }
}

fn override_from_env<T: FromStr>(name: &str, slot: &mut T) -> Result<(), AppError> {
    if let Ok(raw) = env::var(name) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value '{raw}'")))?;
    }
    Ok(())
}
