use serde::{Deserialize, Serialize};

use crate::realtime::events::ChangeEvent;
use crate::services::aggregates::SessionSnapshot;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Ask for a fresh snapshot, e.g. after the client dropped events.
    Resync,
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// First message on every connection.
    Hello {
        protocol: i32,
        participant_id: String,
        snapshot: SessionSnapshot,
    },

    Change {
        event: ChangeEvent,
    },

    /// Events were dropped; a `snapshot` message follows.
    Resync {
        missed: u64,
    },

    Snapshot {
        snapshot: SessionSnapshot,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    SnapshotFailed,
}
