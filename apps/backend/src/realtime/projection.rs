//! Client-side view of one session built from a snapshot plus change
//! events.
//!
//! Events replace whole entities. Per entity, an event is applied only if
//! its sequence number is newer than the last one seen, so duplicated or
//! reordered deliveries are harmless.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::realtime::events::{ChangeEvent, ChangeOp, EntityKind, Tracked};
use crate::services::aggregates::SessionSnapshot;

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    seq: u64,
    /// `None` marks a deleted entity.
    value: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct LocalProjection {
    session_id: String,
    slots: BTreeMap<(EntityKind, String), Slot>,
    seq: u64,
}

impl LocalProjection {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Self::default()
        }
    }

    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        let mut projection = Self::new(&snapshot.session.id);
        projection.reset(snapshot);
        projection
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Highest sequence number applied so far.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Apply one event. Returns `false` when it was stale or for another
    /// session.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        if event.session_id != self.session_id {
            return false;
        }
        let key = (event.entity, event.id.clone());
        if self.slots.get(&key).is_some_and(|s| s.seq >= event.seq) {
            return false;
        }
        let value = match event.op {
            ChangeOp::Upsert => event.value.clone(),
            ChangeOp::Delete => None,
        };
        self.slots.insert(
            key,
            Slot {
                seq: event.seq,
                value,
            },
        );
        self.seq = self.seq.max(event.seq);
        true
    }

    /// Replace the whole view with a fresh snapshot.
    pub fn reset(&mut self, snapshot: &SessionSnapshot) {
        self.session_id = snapshot.session.id.clone();
        self.slots.clear();
        self.seq = snapshot.seq;

        self.load(std::slice::from_ref(&snapshot.session));
        self.load(&snapshot.teams);
        self.load(&snapshot.participants);
        self.load(&snapshot.leader_votes);
        self.load(&snapshot.catalog);
        self.load(&snapshot.drafted_games);
        self.load(snapshot.dice_roll.as_slice());
        self.load(&snapshot.dice_picks);
        self.load(&snapshot.statistics);
        self.load(&snapshot.titles);
    }

    fn load<T: Tracked>(&mut self, items: &[T]) {
        for item in items {
            let Ok(value) = serde_json::to_value(item) else {
                continue;
            };
            self.slots.insert(
                (T::KIND, item.entity_id().to_string()),
                Slot {
                    seq: self.seq,
                    value: Some(value),
                },
            );
        }
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Value> {
        self.slots
            .get(&(kind, id.to_string()))
            .and_then(|s| s.value.as_ref())
    }

    pub fn get_as<T: DeserializeOwned>(&self, kind: EntityKind, id: &str) -> Option<T> {
        self.get(kind, id)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Live entities of one kind, ordered by id.
    pub fn list(&self, kind: EntityKind) -> Vec<&Value> {
        self.slots
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .filter_map(|(_, s)| s.value.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.values().filter(|s| s.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
