//! Realtime synchronization: change events, per-session fan-out and the
//! live socket.

pub mod events;
pub mod gateway;
pub mod projection;
pub mod protocol;
pub mod socket;

pub use events::{ChangeEvent, ChangeOp, EntityKind, EventBatch, Tracked};
pub use gateway::{ConnectivityStatus, Subscription, SyncGateway, SyncSignal};
pub use projection::LocalProjection;
