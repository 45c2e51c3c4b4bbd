//! Change events emitted by committed engine operations.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::warn;

use crate::repos::catalog::CatalogEntry;
use crate::repos::dice::{DicePick, DiceRoll};
use crate::repos::drafted_games::DraftedGame;
use crate::repos::leader_votes::LeaderVote;
use crate::repos::participants::Participant;
use crate::repos::sessions::Session;
use crate::repos::statistics::Statistic;
use crate::repos::teams::Team;
use crate::repos::titles::Title;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Session,
    Team,
    Participant,
    LeaderVote,
    CatalogEntry,
    DraftedGame,
    DiceRoll,
    DicePick,
    Statistic,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Upsert,
    Delete,
}

/// One entity change as delivered to subscribers. `value` is the full
/// entity for upserts and absent for deletes.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub session_id: String,
    pub entity: EntityKind,
    pub id: String,
    pub op: ChangeOp,
    pub value: Option<serde_json::Value>,
    pub seq: u64,
}

/// An entity that can be published.
pub trait Tracked: Serialize {
    const KIND: EntityKind;
    fn entity_id(&self) -> &str;
}

macro_rules! tracked {
    ($ty:ty, $kind:expr, $($id:tt)+) => {
        impl Tracked for $ty {
            const KIND: EntityKind = $kind;
            fn entity_id(&self) -> &str {
                &self.$($id)+
            }
        }
    };
}

tracked!(Session, EntityKind::Session, id);
tracked!(Team, EntityKind::Team, id);
tracked!(Participant, EntityKind::Participant, id);
tracked!(LeaderVote, EntityKind::LeaderVote, id);
tracked!(CatalogEntry, EntityKind::CatalogEntry, id);
tracked!(DraftedGame, EntityKind::DraftedGame, id);
tracked!(DiceRoll, EntityKind::DiceRoll, session_id);
tracked!(DicePick, EntityKind::DicePick, id);
tracked!(Statistic, EntityKind::Statistic, id);
tracked!(Title, EntityKind::Title, id);

/// A change recorded inside a transaction, before a sequence number exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingChange {
    pub session_id: String,
    pub entity: EntityKind,
    pub id: String,
    pub op: ChangeOp,
    pub value: Option<serde_json::Value>,
}

impl PendingChange {
    pub fn sequenced(self, seq: u64) -> ChangeEvent {
        ChangeEvent {
            session_id: self.session_id,
            entity: self.entity,
            id: self.id,
            op: self.op,
            value: self.value,
            seq,
        }
    }
}

/// Changes collected by one operation; published only after commit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventBatch {
    changes: Vec<PendingChange>,
}

impl EventBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert<T: Tracked>(&mut self, session_id: &str, entity: &T) {
        match serde_json::to_value(entity) {
            Ok(value) => self.push(PendingChange {
                session_id: session_id.to_string(),
                entity: T::KIND,
                id: entity.entity_id().to_string(),
                op: ChangeOp::Upsert,
                value: Some(value),
            }),
            Err(e) => warn!(kind = ?T::KIND, error = %e, "dropping unserializable change"),
        }
    }

    pub fn upsert_all<'a, T: Tracked + 'a>(
        &mut self,
        session_id: &str,
        entities: impl IntoIterator<Item = &'a T>,
    ) {
        for entity in entities {
            self.upsert(session_id, entity);
        }
    }

    pub fn delete<T: Tracked>(&mut self, session_id: &str, entity: &T) {
        self.push(PendingChange {
            session_id: session_id.to_string(),
            entity: T::KIND,
            id: entity.entity_id().to_string(),
            op: ChangeOp::Delete,
            value: None,
        });
    }

    /// Later changes to the same entity replace earlier ones in place.
    fn push(&mut self, change: PendingChange) {
        if let Some(existing) = self.changes.iter_mut().find(|c| {
            c.session_id == change.session_id && c.entity == change.entity && c.id == change.id
        }) {
            *existing = change;
        } else {
            self.changes.push(change);
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn into_changes(self) -> Vec<PendingChange> {
        self.changes
    }
}
