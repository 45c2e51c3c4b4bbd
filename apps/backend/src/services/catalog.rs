//! Game catalog management.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info, warn};

use super::access::{actor_in_session, mutable_session, require_referee};
use crate::domain::stat_schema::StatSchema;
use crate::domain::titles::TitleRuleRegistry;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::realtime::EventBatch;
use crate::repos::catalog::{self, CatalogCreate, CatalogEntry};
use crate::utils::names::normalize_name;

pub const DEFAULT_RULE_KEY: &str = "stat_leaders";

#[derive(Debug, Clone)]
pub struct NewCatalogEntry {
    pub name: String,
    pub description: String,
    pub rule_key: Option<String>,
    pub stat_schema: StatSchema,
}

#[derive(Default)]
pub struct CatalogService;

impl CatalogService {
    /// Add an entry visible to every session.
    pub async fn create_global_entry(
        &self,
        txn: &DatabaseTransaction,
        rules: &TitleRuleRegistry,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        debug!(name = %entry.name, "Creating global catalog entry");
        let dto = build_create(rules, entry)?;
        let created = catalog::create_entry(txn, dto).await?;
        info!(catalog_id = %created.id, "Global catalog entry created");
        Ok(created)
    }

    /// Add an entry only `session_id` can draft. Referee only.
    pub async fn create_session_entry(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        rules: &TitleRuleRegistry,
        session_id: &str,
        actor_id: &str,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        debug!(session_id, name = %entry.name, "Creating session catalog entry");
        mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "add games to the catalog")?;

        let dto = build_create(rules, entry)?.in_session(session_id);
        let created = catalog::create_entry(txn, dto).await?;
        events.upsert(session_id, &created);
        info!(session_id, catalog_id = %created.id, "Session catalog entry created");
        Ok(created)
    }
}

fn build_create(
    rules: &TitleRuleRegistry,
    entry: NewCatalogEntry,
) -> Result<CatalogCreate, DomainError> {
    let name = normalize_name(&entry.name, "game name")?;
    entry.stat_schema.validate()?;
    let rule_key = entry
        .rule_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| DEFAULT_RULE_KEY.to_string());
    if !rules.contains(&rule_key) {
        // Stored anyway; a rule registered later picks it up.
        warn!(rule_key = %rule_key, known = ?rules.keys(), "catalog entry uses an unknown title rule");
    }
    Ok(CatalogCreate::new(name, rule_key)
        .with_description(entry.description.trim())
        .with_stat_schema(entry.stat_schema.encode()))
}
