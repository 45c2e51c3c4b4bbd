//! Pluggable per-game title rules.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::stat_schema::{Pick, StatSchema};
use crate::domain::titles::{all_tied_for_best, TitleGrant};

#[derive(Debug, Clone, PartialEq)]
pub struct StatLine {
    pub participant_id: String,
    pub key: String,
    pub value: f64,
}

/// Computes the titles of one drafted game from its statistics.
///
/// Must be deterministic: the same input always yields the same grants.
pub trait GameTitleRule: Send + Sync {
    fn key(&self) -> &'static str;

    fn compute(
        &self,
        schema: &StatSchema,
        stats: &[StatLine],
        default_points: f64,
    ) -> Vec<TitleGrant>;
}

/// For every schema field carrying a title, awards it to everyone tied for
/// the highest (or lowest) submitted value of that key.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatLeaders;

impl GameTitleRule for StatLeaders {
    fn key(&self) -> &'static str {
        "stat_leaders"
    }

    fn compute(
        &self,
        schema: &StatSchema,
        stats: &[StatLine],
        default_points: f64,
    ) -> Vec<TitleGrant> {
        let mut grants = Vec::new();
        for field in schema.fields() {
            let Some(title) = &field.title else {
                continue;
            };
            let values: Vec<(String, f64)> = stats
                .iter()
                .filter(|s| s.key == field.key && s.value.is_finite())
                .map(|s| (s.participant_id.clone(), s.value))
                .collect();

            let leaders = match title.pick {
                Pick::Max => all_tied_for_best(&values, |a, b| a > b),
                Pick::Min => all_tied_for_best(&values, |a, b| a < b),
            };
            for participant_id in leaders {
                grants.push(TitleGrant {
                    participant_id: participant_id.to_string(),
                    name: title.name.clone(),
                    description: if title.description.is_empty() {
                        format!("Led the game in {}", field.label)
                    } else {
                        title.description.clone()
                    },
                    is_humorous: title.humorous,
                    points: title.points.unwrap_or(default_points),
                });
            }
        }
        grants
    }
}

/// Rule for games that award nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTitles;

impl GameTitleRule for NoTitles {
    fn key(&self) -> &'static str {
        "none"
    }

    fn compute(&self, _: &StatSchema, _: &[StatLine], _: f64) -> Vec<TitleGrant> {
        Vec::new()
    }
}

/// Rules keyed by the catalog entry's `rule_key`.
#[derive(Clone, Default)]
pub struct TitleRuleRegistry {
    rules: HashMap<&'static str, Arc<dyn GameTitleRule>>,
}

impl TitleRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        Self::new().register(StatLeaders).register(NoTitles)
    }

    pub fn register(mut self, rule: impl GameTitleRule + 'static) -> Self {
        self.rules.insert(rule.key(), Arc::new(rule));
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn GameTitleRule>> {
        self.rules.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.rules.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

impl std::fmt::Debug for TitleRuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleRuleRegistry")
            .field("rules", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stat_schema::{StatField, TitleSpec};

    fn schema() -> StatSchema {
        StatSchema(vec![
            StatField {
                key: "cups".into(),
                label: "Cups".into(),
                title: Some(TitleSpec {
                    name: "Sharpshooter".into(),
                    description: String::new(),
                    pick: Pick::Max,
                    humorous: false,
                    points: None,
                }),
            },
            StatField {
                key: "spills".into(),
                label: "Spills".into(),
                title: Some(TitleSpec {
                    name: "Steady Hands".into(),
                    description: "Spilled the least".into(),
                    pick: Pick::Min,
                    humorous: true,
                    points: Some(0.25),
                }),
            },
            StatField {
                key: "notes".into(),
                label: "Notes".into(),
                title: None,
            },
        ])
    }

    fn line(p: &str, key: &str, value: f64) -> StatLine {
        StatLine {
            participant_id: p.into(),
            key: key.into(),
            value,
        }
    }

    #[test]
    fn stat_leaders_awards_every_tied_leader() {
        let stats = vec![
            line("a", "cups", 3.0),
            line("b", "cups", 5.0),
            line("c", "cups", 5.0),
            line("a", "spills", 0.0),
            line("b", "spills", 2.0),
            line("a", "notes", 100.0),
        ];
        let grants = StatLeaders.compute(&schema(), &stats, 1.0);
        let summary: Vec<_> = grants
            .iter()
            .map(|g| (g.participant_id.as_str(), g.name.as_str(), g.points))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("b", "Sharpshooter", 1.0),
                ("c", "Sharpshooter", 1.0),
                ("a", "Steady Hands", 0.25),
            ]
        );
        assert!(grants[2].is_humorous);
        assert_eq!(grants[0].description, "Led the game in Cups");
    }

    #[test]
    fn no_stats_no_titles() {
        assert!(StatLeaders.compute(&schema(), &[], 1.0).is_empty());
    }

    #[test]
    fn registry_lookup() {
        let registry = TitleRuleRegistry::with_builtins();
        assert!(registry.contains("stat_leaders"));
        assert!(registry.get("unknown").is_none());
        assert_eq!(registry.keys(), vec!["none", "stat_leaders"]);
    }
}
