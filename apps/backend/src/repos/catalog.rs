//! Game catalog repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::catalog_sea as catalog_adapter;
use crate::domain::stat_schema::StatSchema;
use crate::entities::game_catalog;
use crate::errors::domain::{DomainError, NotFoundKind};

pub use catalog_adapter::CatalogCreate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    /// `None` for global entries.
    pub session_id: Option<String>,
    pub name: String,
    pub description: String,
    pub rule_key: String,
    pub stat_schema: StatSchema,
}

impl TryFrom<game_catalog::Model> for CatalogEntry {
    type Error = DomainError;

    fn try_from(m: game_catalog::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            stat_schema: StatSchema::decode(&m.stat_schema)?,
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            description: m.description,
            rule_key: m.rule_key,
        })
    }
}

fn decode_all(rows: Vec<game_catalog::Model>) -> Result<Vec<CatalogEntry>, DomainError> {
    rows.into_iter().map(CatalogEntry::try_from).collect()
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    catalog_id: &str,
) -> Result<Option<CatalogEntry>, DomainError> {
    catalog_adapter::find_by_id(conn, catalog_id)
        .await?
        .map(CatalogEntry::try_from)
        .transpose()
}

pub async fn require_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    catalog_id: &str,
) -> Result<CatalogEntry, DomainError> {
    find_by_id(conn, catalog_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::CatalogEntry,
            format!("Catalog entry {catalog_id} not found"),
        )
    })
}

pub async fn find_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<String>,
) -> Result<Vec<CatalogEntry>, DomainError> {
    decode_all(catalog_adapter::find_many(conn, ids).await?)
}

/// Global entries plus those scoped to `session_id`, oldest first.
pub async fn list_visible<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<CatalogEntry>, DomainError> {
    decode_all(catalog_adapter::list_visible(conn, session_id).await?)
}

pub async fn create_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CatalogCreate,
) -> Result<CatalogEntry, DomainError> {
    CatalogEntry::try_from(catalog_adapter::create_entry(conn, dto).await?)
}
