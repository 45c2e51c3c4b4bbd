//! DTOs for sessions_sea adapter.

use crate::entities::sessions::SessionStatus;

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct SessionCreate {
    pub name: String,
    pub room_code: String,
    pub round_target: i32,
}

impl SessionCreate {
    pub fn new(name: impl Into<String>, room_code: impl Into<String>, round_target: i32) -> Self {
        Self {
            name: name.into(),
            room_code: room_code.into(),
            round_target,
        }
    }
}

/// Conditional update of a session row.
///
/// The write only lands if the row still has `expect_status` (and, when set,
/// `expect_active_team` as its active-draft team).
#[derive(Debug, Clone)]
pub struct SessionCas {
    pub id: String,
    pub expect_status: SessionStatus,
    pub expect_active_team: Option<String>,
    pub status: Option<SessionStatus>,
    pub active_draft_team_id: Option<Option<String>>,
    pub on_deck_team_id: Option<Option<String>>,
}

impl SessionCas {
    pub fn new(id: impl Into<String>, expect_status: SessionStatus) -> Self {
        Self {
            id: id.into(),
            expect_status,
            expect_active_team: None,
            status: None,
            active_draft_team_id: None,
            on_deck_team_id: None,
        }
    }

    pub fn expect_active_team(mut self, team_id: impl Into<String>) -> Self {
        self.expect_active_team = Some(team_id.into());
        self
    }

    pub fn to_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_active_team(mut self, team_id: Option<String>) -> Self {
        self.active_draft_team_id = Some(team_id);
        self
    }

    pub fn with_on_deck(mut self, team_id: Option<String>) -> Self {
        self.on_deck_team_id = Some(team_id);
        self
    }
}
