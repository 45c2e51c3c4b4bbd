//! Statistic schema carried by catalog entries.
//!
//! Each field names one statistic key clients submit for a game. A field can
//! carry a title descriptor, which the `stat_leaders` rule turns into a
//! per-game award for whoever leads that statistic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    #[default]
    Max,
    Min,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pick: Pick,
    #[serde(default)]
    pub humorous: bool,
    /// Falls back to the configured per-game title points.
    pub points: Option<f64>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatField {
    pub key: String,
    pub label: String,
    pub title: Option<TitleSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatSchema(pub Vec<StatField>);

impl StatSchema {
    /// Decode a stored schema. A stored schema that fails to decode is
    /// corrupt data, not bad input.
    pub fn decode(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw).map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("stored stat schema is invalid: {e}"),
            )
        })
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn fields(&self) -> &[StatField] {
        &self.0
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for field in &self.0 {
            if field.key.trim().is_empty() {
                return Err(invalid("statSchema field key must not be empty"));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(invalid(format!(
                    "statSchema key '{}' appears more than once",
                    field.key
                )));
            }
            if let Some(title) = &field.title {
                if title.name.trim().is_empty() {
                    return Err(invalid(format!(
                        "statSchema field '{}' has a title without a name",
                        field.key
                    )));
                }
                if let Some(points) = title.points {
                    if !points.is_finite() || points < 0.0 {
                        return Err(invalid(format!(
                            "statSchema field '{}' has invalid title points",
                            field.key
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidStatSchema, detail)
}
